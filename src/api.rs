//! Entry point: turn a configuration and a set of models into a mountable router.

use crate::config::{resolve, ApiConfig, ResolvedApi, DEFAULT_BODY_LIMIT};
use crate::error::ConfigError;
use crate::model::ModelRegistry;
use crate::routes::model_routes;
use axum::Router;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

/// A generated REST API. Build once at startup, then mount [`ModelApi::router`]
/// under any base path.
#[derive(Clone)]
pub struct ModelApi {
    api: Arc<ResolvedApi>,
    body_limit: usize,
}

impl ModelApi {
    /// Select the exposed models and precompute every guard chain.
    /// Fails on unknown model names, bad patterns or colliding routes.
    pub fn new(config: &ApiConfig, registry: &ModelRegistry) -> Result<Self, ConfigError> {
        let api = resolve(config, registry)?;
        tracing::info!(models = ?api.names(), "model API ready");
        Ok(Self {
            api: Arc::new(api),
            body_limit: DEFAULT_BODY_LIMIT,
        })
    }

    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    pub fn api(&self) -> &ResolvedApi {
        &self.api
    }

    pub fn router(&self) -> Router {
        model_routes(self.api.clone()).layer(RequestBodyLimitLayer::new(self.body_limit))
    }
}
