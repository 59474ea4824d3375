//! Utility functions shared by the controllers and the terminal UI.
//!
//! - **URL validation**: API root and article link checks
//! - **Text processing**: input normalization, control-char stripping and
//!   Unicode-aware truncation
//!
//! # Examples
//!
//! ```
//! use newsdigest::util::{non_blank, truncate_to_width, validate_api_base};
//!
//! assert!(validate_api_base("https://digest.example.com/api").is_ok());
//! assert_eq!(non_blank("   "), None);
//! assert_eq!(truncate_to_width("Long article title", 10), "Long ar...");
//! ```

mod text;
mod url_validator;

pub use text::{display_width, non_blank, strip_control_chars, truncate_to_width};
pub use url_validator::{validate_api_base, validate_url_for_open, UrlValidationError};

/// Maximum allowed search query length.
pub const MAX_SEARCH_QUERY_LENGTH: usize = 256;
