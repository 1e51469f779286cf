//! Scopes.
//!
//! Scopes form two graphs over the same nodes:
//!
//! - the lexical chain (`parent`): block → method → unit
//! - the type ancestry chain (`supertype`): type scope → ancestor type scope
//!
//! A method scope also records the type scope of the type it belongs to
//! (`enclosing_type`), which is where a name search leaves the lexical chain
//! to look through inherited members.

use indexmap::IndexMap;

use super::decl::Section;
use super::ids::{DeclId, ScopeId, TypeId, UnitId};
use crate::base::Name;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Unit,
    /// Members of a struct or enumeration.
    Type,
    /// Parameters and locals of a routine.
    Method,
    /// A `begin ... end` block or a `for var` loop.
    Block,
}

/// A unit named in a `uses` clause.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Import {
    pub unit: UnitId,
    pub section: Section,
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub unit: UnitId,
    /// Lexically enclosing scope.
    pub parent: Option<ScopeId>,
    /// Type scope of the ancestor type (type scopes only).
    pub supertype: Option<ScopeId>,
    /// Type scope of the owning type (method scopes only).
    pub enclosing_type: Option<ScopeId>,
    /// The type whose members live here (type scopes only).
    pub owner_type: Option<TypeId>,
    /// The routine whose locals live here (method scopes only).
    pub owner_method: Option<DeclId>,
    /// Imported units in `uses` order (unit scopes only).
    pub imports: Vec<Import>,
    declarations: IndexMap<Name, Vec<DeclId>>,
}

impl Scope {
    pub fn new(kind: ScopeKind, unit: UnitId, parent: Option<ScopeId>) -> Self {
        Self {
            kind,
            unit,
            parent,
            supertype: None,
            enclosing_type: None,
            owner_type: None,
            owner_method: None,
            imports: Vec::new(),
            declarations: IndexMap::new(),
        }
    }

    /// Declarations introduced directly in this scope under `name`.
    pub fn find_direct(&self, name: &Name) -> &[DeclId] {
        self.declarations.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every declaration in insertion order.
    pub fn declarations(&self) -> impl Iterator<Item = DeclId> + '_ {
        let mut all: Vec<DeclId> = self.declarations.values().flatten().copied().collect();
        all.sort();
        all.into_iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &Name> {
        self.declarations.keys()
    }

    pub(crate) fn insert(&mut self, name: Name, decl: DeclId) {
        self.declarations.entry(name).or_default().push(decl);
    }
}
