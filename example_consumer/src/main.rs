//! Example consumer: serves an in-memory phone book through model-api-sdk.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Set `API_CONFIG_PATH` to a JSON model configuration to override the default exposure.

use model_api_sdk::{
    common_routes, from_path, guard_fn, ApiConfig, GuardFlow, MemoryModel, MiddlewareTable, ModelApi, ModelOptions,
    ModelRegistry, ServerSettings, SlotName,
};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;

fn default_config() -> ApiConfig {
    let middlewares = MiddlewareTable::new()
        .guard(
            SlotName::All,
            guard_fn(|request| {
                tracing::info!(request_id = %request.id, model = %request.model, action = %request.action, "guarded");
                Ok(GuardFlow::Continue)
            }),
        )
        .disable(SlotName::DeleteMany);
    ApiConfig::new().expose("PhoneBook", ModelOptions::new().middlewares(middlewares))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("model_api_sdk=info,example_consumer=info")),
        )
        .init();

    let settings = ServerSettings::load()?;

    let phonebook = Arc::new(MemoryModel::new("PhoneBook").required(["name"]));
    let samples = [
        json!({"name": "Ada Lovelace", "email": "ada@example.com"}),
        json!({"name": "Alan Turing", "email": "alan@example.com"}),
    ];
    phonebook.seed(samples.iter().filter_map(|v| v.as_object().cloned()).collect())?;
    let registry = ModelRegistry::new().with(phonebook);

    let config = match &settings.config_path {
        Some(path) => from_path(path).await?,
        None => default_config(),
    };
    let api = ModelApi::new(&config, &registry)?.with_body_limit(settings.body_limit);

    let app = if settings.base_path == "/" {
        common_routes().merge(api.router())
    } else {
        common_routes().nest(&settings.base_path, api.router())
    };

    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!(
        "Example consumer listening on http://{}{}",
        listener.local_addr()?,
        settings.base_path
    );
    axum::serve(listener, app).await?;
    Ok(())
}
