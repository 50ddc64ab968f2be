//! Load API configuration from JSON and resolve it against the model registry.

use crate::config::{select, validate, ApiConfig, ExposedModel, ModelOptions, ResolvedApi, Selection};
use crate::error::ConfigError;
use crate::model::ModelRegistry;
use std::path::Path;
use std::sync::Arc;

pub fn from_json_str(json: &str) -> Result<ApiConfig, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::Load(e.to_string()))
}

pub async fn from_path(path: impl AsRef<Path>) -> Result<ApiConfig, ConfigError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    from_json_str(&text)
}

/// Build the resolved API from config (selects models, derives route names,
/// precomputes guard chains, validates routes).
pub fn resolve(config: &ApiConfig, registry: &ModelRegistry) -> Result<ResolvedApi, ConfigError> {
    let names = registry.names();
    let selected = select(&config.models, &names).map_err(|e| match e {
        ConfigError::UnknownModel { key, known } if known.is_empty() => ConfigError::UnknownModel {
            key: format!("{} (no model is registered yet)", key),
            known,
        },
        other => other,
    })?;

    let mut models = Vec::with_capacity(selected.len());
    for (name, selection) in selected {
        let options = match selection {
            Selection::Setting(options) => options,
            Selection::Flag(_) => ModelOptions::default(),
        };
        let model = registry.get(&name).ok_or_else(|| ConfigError::UnknownModel {
            key: name.clone(),
            known: names.clone(),
        })?;
        let singular = options.singular.unwrap_or_else(|| name.clone());
        let plural = options.plural.unwrap_or_else(|| format!("{}s", name));
        tracing::info!(model = %name, singular = %singular, plural = %plural, "exposing model");
        models.push(ExposedModel::new(
            name,
            singular,
            plural,
            options.middlewares.unwrap_or_default(),
            model,
        ));
    }
    validate(&models)?;

    Ok(ResolvedApi {
        models: models.into_iter().map(Arc::new).collect(),
    })
}
