//! Machine-readable API map answered on OPTIONS.

use crate::config::{ExposedModel, ResolvedApi};
use crate::request::Plurality;
use serde_json::{json, Map, Value};

/// Description of one route of `exposed`.
pub fn route_map(exposed: &ExposedModel, plurality: Plurality, base_url: &str) -> Value {
    match plurality {
        Plurality::Plural => {
            let path = format!("/{}", exposed.plural);
            json!({
                "path": path,
                "description": format!("Base API to query on SEVERAL items of {}", exposed.name),
                "canonicalUrl": format!("{}{}", base_url, path),
            })
        }
        Plurality::Singular => {
            let path = format!("/{}/$ID", exposed.singular);
            json!({
                "path": path,
                "description": format!("Base API to query on a SINGLE item of {}", exposed.name),
                "parameters": {
                    "$ID": {
                        "optional": true,
                        "description": "Id of the item to match",
                    },
                },
                "canonicalUrl": format!("{}{}", base_url, path),
            })
        }
    }
}

fn header(base_url: &str) -> Map<String, Value> {
    let mut out = Map::new();
    out.insert("apiType".into(), json!(env!("CARGO_PKG_NAME")));
    out.insert("version".into(), json!(env!("CARGO_PKG_VERSION")));
    out.insert("currentUrl".into(), json!(base_url));
    out
}

/// OPTIONS on a model route.
pub fn route_options(exposed: &ExposedModel, plurality: Plurality, base_url: &str) -> Value {
    let mut out = header(base_url);
    if let Value::Object(route) = route_map(exposed, plurality, base_url) {
        out.extend(route);
    }
    Value::Object(out)
}

/// OPTIONS on the base path: every route of every exposed model.
pub fn api_map(api: &ResolvedApi, base_url: &str) -> Value {
    let routes: Map<String, Value> = api
        .models
        .iter()
        .map(|exposed| {
            let mut model_routes = Map::new();
            model_routes.insert(
                format!("/{}/$ID", exposed.singular),
                route_map(exposed, Plurality::Singular, base_url),
            );
            model_routes.insert(format!("/{}", exposed.plural), route_map(exposed, Plurality::Plural, base_url));
            (exposed.name.clone(), Value::Object(model_routes))
        })
        .collect();
    let mut out = header(base_url);
    out.insert("routes".into(), Value::Object(routes));
    Value::Object(out)
}
