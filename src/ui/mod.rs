//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling per onboarding phase and dialog
//! - `render` - View rendering dispatch
//! - `helpers` - Shared utility functions
//! - `auth` - Login/signup form
//! - `categories` - Category picker (onboarding and settings)
//! - `articles` - Search bar and article list
//! - `dialogs` - Summary and settings overlays
//! - `status` - Status bar widget

mod articles;
mod auth;
mod categories;
mod dialogs;
mod helpers;
mod input;
mod loop_runner;
mod render;
mod status;

pub use loop_runner::{run, Action};
