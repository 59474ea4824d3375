//! Backend REST API: wire types, error taxonomy and the request gateway.
mod error;
mod gateway;
mod types;

pub use error::{ApiError, AUTH_FAILED_MESSAGE};
pub use gateway::Gateway;
pub use types::{Article, Category, Preferences};
