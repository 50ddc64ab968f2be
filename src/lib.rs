//! Model API SDK: expose data models as a REST API, configured per model with
//! route names and guard middleware.

pub mod api;
pub mod config;
pub mod error;
pub mod extractors;
pub mod guard;
pub mod handlers;
pub mod model;
pub mod request;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;

pub use api::ModelApi;
pub use config::{from_json_str, from_path, ApiConfig, ModelOptions, ModelSelection, Selection, ServerSettings};
pub use error::{ApiError, ApiErrorKind, ConfigError, DataError, ErrorCause};
pub use extractors::JsonAccept;
pub use guard::{guard_fn, Guard, GuardFlow, MiddlewareTable, SharedGuard, SlotName, SlotValue};
pub use model::{Entity, Filter, Model, ModelRegistry, QueryOptions};
pub use request::{Action, HttpVerb, Plurality, RequestDescriptor};
pub use routes::{common_routes, model_routes};
pub use store::MemoryModel;
