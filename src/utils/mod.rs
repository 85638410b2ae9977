//! Utility functions and helpers.
//!
//! # Submodules
//!
//! - [`paths`]: Pattern expansion and lexical path normalization

/// Path expansion and normalization utilities
pub mod paths;

pub use paths::{expand_pattern, make_absolute, normalize};
