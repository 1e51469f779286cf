//! # delphi-sema
//!
//! Name and type resolution for Delphi / Object Pascal static analysis.
//!
//! Given the syntax trees of a set of units, the crate builds a
//! [`SymbolTable`](hir::SymbolTable): every scope, declaration and type, the
//! binding of every name reference, and the inter-unit dependencies.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! xref    → cross-reference queries (usages, goto definition, dependency report)
//!   ↓
//! hir     → semantic model: types, scopes, search, operators, builder
//!   ↓
//! ast     → read-only syntax tree handed over by the parser
//!   ↓
//! base    → primitives (case-insensitive Name, LineCol)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use delphi_sema::{AnalysisConfig, SymbolTableBuilder};
//!
//! let table = SymbolTableBuilder::new(AnalysisConfig::default().with_unit_scope_name("System"))
//!     .add_units(parsed_units)
//!     .build()?;
//!
//! for diagnostic in table.diagnostics() {
//!     eprintln!("{diagnostic}");
//! }
//! ```

/// Foundation types: case-insensitive names and positions
pub mod base;

/// Read-only syntax tree
pub mod ast;

/// Semantic model and resolution
pub mod hir;

/// Cross-reference queries over a built table
pub mod xref;

mod config;
mod error;

pub use base::{LineCol, Name};
pub use config::AnalysisConfig;
pub use error::{Result, SemaError};
pub use hir::{Diagnostic, Location, SymbolTable, SymbolTableBuilder};
