//! Terminal client for an AI news digest service.
//!
//! The binary in `main.rs` wires these modules to a terminal; integration
//! tests drive [`app::App`] directly against a mock backend.

pub mod api;
pub mod app;
pub mod config;
pub mod controller;
pub mod session;
pub mod storage;
pub mod ui;
pub mod util;
