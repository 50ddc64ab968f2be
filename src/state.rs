//! Router state: the resolved API, plus one handle per generated route.

use crate::config::{ExposedModel, ResolvedApi};
use crate::request::Plurality;
use std::sync::Arc;

/// State of the base-path routes.
#[derive(Clone)]
pub struct ApiState {
    pub api: Arc<ResolvedApi>,
}

/// State of one model route: which model, and whether it is the singular or plural route.
#[derive(Clone)]
pub struct RouteState {
    pub exposed: Arc<ExposedModel>,
    pub plurality: Plurality,
}
