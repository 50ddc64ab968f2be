//! Route validation: names must be usable as a single path segment and unique.

use crate::config::ExposedModel;
use crate::error::ConfigError;
use std::collections::HashSet;

pub fn validate_route_name(model: &str, name: &str) -> Result<(), ConfigError> {
    if name.is_empty() || name.contains(['/', ':', '*', '?', '#']) || name.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidRouteName {
            model: model.to_string(),
            name: name.to_string(),
        });
    }
    Ok(())
}

pub fn validate(models: &[ExposedModel]) -> Result<(), ConfigError> {
    let mut routes = HashSet::new();
    for exposed in models {
        validate_route_name(&exposed.name, &exposed.singular)?;
        validate_route_name(&exposed.name, &exposed.plural)?;
        if exposed.singular == exposed.plural {
            return Err(ConfigError::DuplicateRoute(exposed.plural.clone()));
        }
        for route in [&exposed.singular, &exposed.plural] {
            if !routes.insert(route.as_str()) {
                return Err(ConfigError::DuplicateRoute(route.clone()));
            }
        }
    }
    Ok(())
}
