pub mod common;
pub mod model;

pub use common::common_routes;
pub use model::model_routes;
