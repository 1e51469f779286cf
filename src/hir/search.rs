//! Name search.
//!
//! Finds the declarations a name occurrence refers to, starting from the
//! scope the occurrence appears in:
//!
//! 1. Look in the scope itself (for unit scopes: own declarations, then the
//!    interfaces of imported units, last `uses` entry first, then System).
//! 2. If nothing was found and the scope is a method scope of a type, or a
//!    type scope with an ancestor, walk the type ancestry chain, stopping at
//!    the first type scope that declares the name.
//! 3. If still nothing, move to the lexical parent and repeat.
//!
//! The first non-empty answer wins; an exhausted chain yields an empty result.
//! The search only reads the symbol table.
//!
//! Operator methods (`class operator Add`) are invisible to name search; they
//! are reached through [`OperatorInvocableCollector`](super::OperatorInvocableCollector).

use super::ids::{DeclId, Location, ScopeId, TypeId, UnitId};
use super::scope::ScopeKind;
use super::table::SymbolTable;
use crate::base::Name;

/// A context a qualified reference is searched in (`TFoo.Bar`, `SysUtils.Format`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Qualifier {
    Type(TypeId),
    Unit(UnitId),
}

/// A name reference to resolve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameOccurrence {
    pub name: Name,
    pub location: Option<Location>,
    pub qualifier: Option<Qualifier>,
}

impl NameOccurrence {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            location: None,
            qualifier: None,
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn qualified(mut self, qualifier: Qualifier) -> Self {
        self.qualifier = Some(qualifier);
        self
    }
}

/// One step of a search, as reported to a trace sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchEvent {
    CheckingScope(ScopeId),
    MovingUp { from: ScopeId, to: ScopeId },
    CheckingTypeScope(ScopeId),
    MovingUpType { from: ScopeId, to: ScopeId },
    Found { scope: ScopeId, count: usize },
}

/// A single name search over a symbol table.
pub struct Search<'a> {
    table: &'a SymbolTable,
    trace: Option<&'a mut dyn FnMut(&SearchEvent)>,
}

impl<'a> Search<'a> {
    pub fn new(table: &'a SymbolTable) -> Self {
        Self { table, trace: None }
    }

    /// Report every visited scope to `sink`.
    pub fn with_trace(mut self, sink: &'a mut dyn FnMut(&SearchEvent)) -> Self {
        self.trace = Some(sink);
        self
    }

    fn emit(&mut self, event: SearchEvent) {
        tracing::trace!(?event, "name search");
        if let Some(sink) = self.trace.as_deref_mut() {
            sink(&event);
        }
    }

    /// The declarations `occurrence` refers to, searched from `scope`.
    ///
    /// Qualified occurrences ignore `scope` and search their qualifier.
    pub fn execute(&mut self, occurrence: &NameOccurrence, scope: ScopeId) -> Vec<DeclId> {
        match occurrence.qualifier {
            Some(Qualifier::Type(ty)) => self.search_type_members(ty, &occurrence.name),
            Some(Qualifier::Unit(unit)) => self.search_unit(unit, scope, &occurrence.name),
            None => {
                let mut result = Vec::new();
                self.walk(&occurrence.name, scope, |level, _| {
                    result = level.to_vec();
                    !result.is_empty()
                });
                result
            }
        }
    }

    /// Members of `ty` named `name`, falling back to its ancestors.
    pub fn search_type_members(&mut self, ty: TypeId, name: &Name) -> Vec<DeclId> {
        let Some(scope) = self.table.types().type_scope(ty) else {
            return Vec::new();
        };
        let mut result = Vec::new();
        self.walk_type_chain(name, Some(scope), |level, _| {
            result = level.to_vec();
            !result.is_empty()
        });
        result
    }

    /// Overload candidates for a call of `occurrence` from `scope`, each with
    /// its distance from the call site (0 = innermost level).
    ///
    /// The search continues past the first level that declares the name as
    /// long as every declaration found there is an `overload` method.
    pub fn search_overloads(&mut self, occurrence: &NameOccurrence, scope: ScopeId) -> Vec<(DeclId, u32)> {
        let table = self.table;
        let mut result = Vec::new();
        let mut collect = |level: &[DeclId], distance: u32| collect_overloads(table, level, distance, &mut result);
        match occurrence.qualifier {
            Some(Qualifier::Type(ty)) => {
                let start = table.types().type_scope(ty);
                self.walk_type_chain(&occurrence.name, start, &mut collect);
            }
            Some(Qualifier::Unit(unit)) => {
                let level = self.search_unit(unit, scope, &occurrence.name);
                collect(&level, 0);
            }
            None => self.walk(&occurrence.name, scope, &mut collect),
        }
        result
    }

    fn search_unit(&mut self, unit: UnitId, from: ScopeId, name: &Name) -> Vec<DeclId> {
        let own_unit = self.table.scope(from).unit == unit;
        let scope = self.table.unit(unit).scope;
        self.emit(SearchEvent::CheckingScope(scope));
        let found = if own_unit {
            self.visible(self.table.scope(scope).find_direct(name))
        } else {
            self.visible(&self.table.find_in_unit_interface(unit, name))
        };
        if !found.is_empty() {
            self.emit(SearchEvent::Found {
                scope,
                count: found.len(),
            });
        }
        found
    }

    fn visible(&self, level: &[DeclId]) -> Vec<DeclId> {
        level
            .iter()
            .copied()
            .filter(|&id| !self.table.declaration(id).is_operator())
            .collect()
    }

    /// Walk the lexical chain from `scope`, offering each lookup level to
    /// `visit` with its distance until `visit` returns true.
    fn walk(&mut self, name: &Name, scope: ScopeId, mut visit: impl FnMut(&[DeclId], u32) -> bool) {
        let table = self.table;
        let mut distance = 0;
        let mut current = Some(scope);
        while let Some(id) = current {
            self.emit(SearchEvent::CheckingScope(id));
            for level in table.lookup_levels(id, name) {
                let level = self.visible(&level);
                let stop = visit(&level, distance);
                distance += 1;
                if stop {
                    self.emit(SearchEvent::Found {
                        scope: id,
                        count: level.len(),
                    });
                    return;
                }
            }

            let data = table.scope(id);
            let ancestry = match data.kind {
                ScopeKind::Method => data.enclosing_type,
                ScopeKind::Type => data.supertype,
                ScopeKind::Unit | ScopeKind::Block => None,
            };
            let mut stopped = false;
            self.walk_type_chain(name, ancestry, |level, offset| {
                stopped = visit(level, distance + offset);
                stopped
            });
            if stopped {
                return;
            }
            distance += self.chain_length(ancestry);

            current = data.parent;
            if let Some(parent) = current {
                self.emit(SearchEvent::MovingUp { from: id, to: parent });
            }
        }
    }

    /// Walk a type ancestry chain from `start`.
    fn walk_type_chain(&mut self, name: &Name, start: Option<ScopeId>, mut visit: impl FnMut(&[DeclId], u32) -> bool) {
        let table = self.table;
        let mut offset = 0;
        let mut current = start;
        while let Some(id) = current {
            self.emit(SearchEvent::CheckingTypeScope(id));
            let level = self.visible(table.scope(id).find_direct(name));
            if visit(&level, offset) {
                self.emit(SearchEvent::Found {
                    scope: id,
                    count: level.len(),
                });
                return;
            }
            offset += 1;
            current = table.scope(id).supertype;
            if let Some(next) = current {
                self.emit(SearchEvent::MovingUpType { from: id, to: next });
            }
        }
    }

    fn chain_length(&self, start: Option<ScopeId>) -> u32 {
        let mut length = 0;
        let mut current = start;
        while let Some(id) = current {
            length += 1;
            current = self.table.scope(id).supertype;
        }
        length
    }
}

/// Add the methods of one lookup level; returns true when the level ends
/// the overload search.
fn collect_overloads(table: &SymbolTable, level: &[DeclId], distance: u32, result: &mut Vec<(DeclId, u32)>) -> bool {
    if level.is_empty() {
        return false;
    }
    let mut stop = false;
    for &id in level {
        let decl = table.declaration(id);
        match decl.method() {
            Some(method) => {
                if !result.iter().any(|(seen, _)| *seen == id) {
                    result.push((id, distance));
                }
                stop |= !method.is_overload;
            }
            None => stop = true,
        }
    }
    stop
}
