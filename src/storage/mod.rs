//! Durable client-side state (SQLite).
//!
//! The only thing persisted is the session credential; everything else the
//! client shows is re-fetched from the backend.

mod client_state;
mod schema;
mod types;

pub use schema::Database;
pub use types::{DatabaseError, StateEntry};
