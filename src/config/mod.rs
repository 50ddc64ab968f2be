pub mod types;
pub mod selector;
pub mod loader;
pub mod validator;
pub mod resolved;
pub mod settings;

pub use types::*;
pub use selector::*;
pub use loader::*;
pub use validator::*;
pub use resolved::*;
pub use settings::*;
