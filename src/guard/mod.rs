//! Guards: per-model middleware run ahead of the terminal CRUD handler.

pub mod chain;
pub mod table;

pub use chain::*;
pub use table::*;

use crate::error::ApiError;
use crate::model::Model;
use crate::request::RequestDescriptor;
use async_trait::async_trait;
use axum::response::Response;
use std::sync::Arc;

/// What a guard decided.
pub enum GuardFlow {
    /// Hand the request to the next link.
    Continue,
    /// Stop here and send this response.
    Respond(Response),
}

/// A middleware step. Guards may rewrite the descriptor (e.g. narrow the filter)
/// before the terminal handler sees it.
#[async_trait]
pub trait Guard: Send + Sync {
    async fn check(&self, request: &mut RequestDescriptor, model: &dyn Model) -> Result<GuardFlow, ApiError>;
}

pub type SharedGuard = Arc<dyn Guard>;

/// Adapter for synchronous guard closures.
pub struct FnGuard<F>(F);

#[async_trait]
impl<F> Guard for FnGuard<F>
where
    F: Fn(&mut RequestDescriptor) -> Result<GuardFlow, ApiError> + Send + Sync,
{
    async fn check(&self, request: &mut RequestDescriptor, _model: &dyn Model) -> Result<GuardFlow, ApiError> {
        (self.0)(request)
    }
}

pub fn guard_fn<F>(f: F) -> SharedGuard
where
    F: Fn(&mut RequestDescriptor) -> Result<GuardFlow, ApiError> + Send + Sync + 'static,
{
    Arc::new(FnGuard(f))
}
