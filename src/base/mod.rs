//! Foundation types for the resolution engine.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`Name`] - Case-insensitive identifiers
//! - [`LineCol`] - Source positions
//!
//! This module has NO dependencies on other crate modules.

mod name;
mod span;

pub use name::Name;
pub use span::LineCol;
