//! Semantic model: scopes, declarations, types and name resolution.
//!
//! ## Layout
//!
//! - [`ids`] - arena indices ([`UnitId`], [`ScopeId`], [`DeclId`], [`TypeId`])
//! - [`ty`] - the type table and type compatibility queries
//! - [`decl`] / [`scope`] / [`unit`] - what the symbol table is made of
//! - [`table`] - the [`SymbolTable`] and its read API
//! - [`search`] - the scope-chain name search
//! - [`operator`] / [`overload`] - operator candidates and overload resolution
//! - [`enumerable`] - structural `for ... in` support
//! - [`expr`] - expression typing over routine bodies
//! - [`builder`] - the two-pass [`SymbolTableBuilder`]
//! - [`diagnostics`] - unresolved and ambiguous references

mod builder;
mod decl;
mod diagnostics;
pub mod enumerable;
mod expr;
mod ids;
mod operator;
mod overload;
mod scope;
mod search;
mod table;
mod ty;
mod unit;

pub use builder::SymbolTableBuilder;
pub use decl::{DeclKey, DeclKind, Declaration, MethodDecl, MethodKind, Parameter, PropertyDecl, Section, VariableKind};
pub use diagnostics::{Diagnostic, DiagnosticCollector, RelatedInfo, Severity, codes};
pub use expr::{ExprResolver, Value};
pub use ids::{DeclId, Location, ScopeId, TypeId, UnitId};
pub use operator::{BinaryOperator, Invocable, Operator, OperatorIntrinsic, OperatorInvocableCollector, UnaryOperator};
pub use overload::{Candidate, Conversion, OverloadResolver, Resolution};
pub use scope::{Import, Scope, ScopeKind};
pub use search::{NameOccurrence, Qualifier, Search, SearchEvent};
pub use table::SymbolTable;
pub use ty::{ArgumentMatcher, ArrayKind, IntrinsicType, StringKind, StructType, TypeData, TypeKind, TypeTable};
pub use unit::Unit;
