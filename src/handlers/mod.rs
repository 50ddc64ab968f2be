//! Built-in handlers: CRUD terminals and the OPTIONS API map.

pub mod crud;
pub mod options;
pub use crud::*;
pub use options::*;
