//! The symbol table: arenas, indexes and the read API.
//!
//! A [`SymbolTable`] is produced by [`SymbolTableBuilder`](super::SymbolTableBuilder)
//! and is immutable afterwards. It owns every type, scope, declaration and unit,
//! plus three indexes keyed by identifier [`Location`]:
//!
//! - node scopes: the scope opened at a routine name, block or `for var` loop
//! - references: the declaration each name reference resolved to
//! - declaration sites: the declaration introduced at a position
//!
//! and the reverse usage index (declaration → reference locations).

use rustc_hash::FxHashMap;

use super::decl::{DeclKind, Declaration, Section};
use super::diagnostics::{Diagnostic, DiagnosticCollector};
use super::ids::{DeclId, Location, ScopeId, TypeId, UnitId};
use super::scope::{Scope, ScopeKind};
use super::search::Search;
use super::ty::TypeTable;
use super::unit::Unit;
use crate::ast::{UnitKind, Visibility};
use crate::base::{LineCol, Name};

/// Outcome of inserting a declaration into a scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Declared {
    New(DeclId),
    /// A declaration with the same name and signature was already there.
    Existing(DeclId),
}

impl Declared {
    pub(crate) fn id(self) -> DeclId {
        match self {
            Declared::New(id) | Declared::Existing(id) => id,
        }
    }
}

#[derive(Debug)]
pub struct SymbolTable {
    pub(crate) types: TypeTable,
    scopes: Vec<Scope>,
    decls: Vec<Declaration>,
    units: Vec<Unit>,
    unit_names: FxHashMap<Name, UnitId>,
    system: Option<UnitId>,
    node_scopes: FxHashMap<Location, ScopeId>,
    references: FxHashMap<Location, DeclId>,
    declaration_sites: FxHashMap<Location, DeclId>,
    usages: FxHashMap<DeclId, Vec<Location>>,
    pub(crate) diagnostics: DiagnosticCollector,
}

impl SymbolTable {
    pub(crate) fn new() -> Self {
        Self {
            types: TypeTable::new(),
            scopes: Vec::new(),
            decls: Vec::new(),
            units: Vec::new(),
            unit_names: FxHashMap::default(),
            system: None,
            node_scopes: FxHashMap::default(),
            references: FxHashMap::default(),
            declaration_sites: FxHashMap::default(),
            usages: FxHashMap::default(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    // ========================================================================
    // CONSTRUCTION (builder only)
    // ========================================================================

    pub(crate) fn add_scope(&mut self, scope: Scope) -> ScopeId {
        let id = ScopeId::from_len(self.scopes.len());
        self.scopes.push(scope);
        id
    }

    pub(crate) fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    pub(crate) fn declaration_mut(&mut self, id: DeclId) -> &mut Declaration {
        &mut self.decls[id.index()]
    }

    /// Create a unit with its scope and the declaration of its own name.
    pub(crate) fn add_unit(&mut self, name: Name, kind: UnitKind, pos: LineCol) -> UnitId {
        let id = UnitId::from_len(self.units.len());
        let scope = self.add_scope(Scope::new(ScopeKind::Unit, id, None));
        let declaration = DeclId::from_len(self.decls.len());
        self.decls.push(Declaration {
            name: name.clone(),
            kind: DeclKind::Unit(id),
            scope,
            location: Location::new(id, pos),
            visibility: Visibility::Public,
            section: Section::Interface,
        });
        self.scopes[scope.index()].insert(name.clone(), declaration);
        self.declaration_sites.insert(Location::new(id, pos), declaration);
        self.units.push(Unit::new(name.clone(), kind, scope, declaration));
        self.unit_names.insert(name, id);
        id
    }

    pub(crate) fn mark_system(&mut self, unit: UnitId) {
        self.units[unit.index()].is_system = true;
        self.system = Some(unit);
    }

    /// Insert a declaration into `decl.scope`.
    ///
    /// A declaration whose name and signature match one already in the scope
    /// is not inserted; the existing one is returned instead.
    pub(crate) fn declare(&mut self, decl: Declaration) -> Declared {
        let scope = decl.scope;
        let signature = decl.signature(&self.types);
        let existing = self.scopes[scope.index()]
            .find_direct(&decl.name)
            .iter()
            .copied()
            .find(|&id| {
                let other = &self.decls[id.index()];
                other.is_method() == decl.is_method() && other.signature(&self.types) == signature
            });
        if let Some(id) = existing {
            return Declared::Existing(id);
        }

        let id = DeclId::from_len(self.decls.len());
        self.declaration_sites.entry(decl.location).or_insert(id);
        self.scopes[scope.index()].insert(decl.name.clone(), id);
        self.decls.push(decl);
        Declared::New(id)
    }

    pub(crate) fn set_node_scope(&mut self, location: Location, scope: ScopeId) {
        self.node_scopes.insert(location, scope);
    }

    /// Record that `location` introduces `decl` without declaring anything
    /// (a method implementation's name).
    pub(crate) fn add_declaration_site(&mut self, location: Location, decl: DeclId) {
        self.declaration_sites.entry(location).or_insert(decl);
    }

    /// Bind the name at `location` to `decl`.
    pub(crate) fn add_reference(&mut self, location: Location, decl: DeclId) {
        if self.references.insert(location, decl).is_none() {
            self.usages.entry(decl).or_default().push(location);
        }
    }

    /// Record that `unit` depends on `target`; self and System references are ignored.
    pub(crate) fn add_dependency(&mut self, unit: UnitId, target: UnitId, section: Section) {
        if unit == target || Some(target) == self.system {
            return;
        }
        self.units[unit.index()].add_dependency(target, section);
    }

    // ========================================================================
    // READ API
    // ========================================================================

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn declaration(&self, id: DeclId) -> &Declaration {
        &self.decls[id.index()]
    }

    /// All declarations in creation order.
    pub fn declarations(&self) -> impl Iterator<Item = (DeclId, &Declaration)> {
        self.decls
            .iter()
            .enumerate()
            .map(|(index, decl)| (DeclId::from_len(index), decl))
    }

    pub fn unit(&self, id: UnitId) -> &Unit {
        &self.units[id.index()]
    }

    pub fn units(&self) -> impl Iterator<Item = (UnitId, &Unit)> {
        self.units
            .iter()
            .enumerate()
            .map(|(index, unit)| (UnitId::from_len(index), unit))
    }

    /// Look a unit up by its full name, ignoring case.
    pub fn unit_by_name(&self, name: &str) -> Option<UnitId> {
        self.unit_names.get(&Name::new(name)).copied()
    }

    pub fn system_unit(&self) -> Option<UnitId> {
        self.system
    }

    /// The scope opened at `location` (a routine name, a block's `begin`,
    /// a `for var` loop variable).
    pub fn node_scope(&self, location: Location) -> Option<ScopeId> {
        self.node_scopes.get(&location).copied()
    }

    /// The declaration a name reference at `location` resolved to.
    pub fn resolved_at(&self, location: Location) -> Option<DeclId> {
        self.references.get(&location).copied()
    }

    /// The declaration introduced at `location`.
    pub fn declared_at(&self, location: Location) -> Option<DeclId> {
        self.declaration_sites.get(&location).copied()
    }

    /// Every reference location bound to `decl`, in resolution order.
    pub fn usages(&self, decl: DeclId) -> &[Location] {
        self.usages.get(&decl).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn interface_dependencies(&self, unit: UnitId) -> Vec<UnitId> {
        self.unit(unit).interface_dependencies().collect()
    }

    pub fn implementation_dependencies(&self, unit: UnitId) -> Vec<UnitId> {
        self.unit(unit).implementation_dependencies().collect()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.diagnostics()
    }

    pub fn diagnostics_for_unit(&self, unit: UnitId) -> Vec<&Diagnostic> {
        self.diagnostics.diagnostics_for_unit(unit)
    }

    /// Storage size of a type; records report the sum of their fields.
    pub fn type_size(&self, ty: TypeId) -> u32 {
        self.types.size(ty)
    }

    /// Members named `name` of a struct type, searching ancestors when the
    /// type itself declares none.
    pub fn find_member(&self, ty: TypeId, name: &str) -> Vec<DeclId> {
        Search::new(self).search_type_members(ty, &Name::new(name))
    }

    // ========================================================================
    // SCOPE LOOKUP
    // ========================================================================

    /// What a scope declares for `name`, before any upward search.
    ///
    /// Unit scopes answer with their own declarations, else the interface
    /// declarations of the last imported unit that has any, else System.
    pub fn find_declaration(&self, scope: ScopeId, name: &Name) -> Vec<DeclId> {
        self.lookup_levels(scope, name)
            .into_iter()
            .find(|level| !level.is_empty())
            .unwrap_or_default()
    }

    /// The lookup of [`SymbolTable::find_declaration`] split into its
    /// precedence levels, nearest first.
    pub(crate) fn lookup_levels(&self, scope: ScopeId, name: &Name) -> Vec<Vec<DeclId>> {
        let data = self.scope(scope);
        let own = data.find_direct(name).to_vec();
        if data.kind != ScopeKind::Unit {
            return vec![own];
        }

        let mut levels = vec![own];
        for import in data.imports.iter().rev() {
            levels.push(self.find_in_unit_interface(import.unit, name));
        }
        if let Some(system) = self.system {
            if system != data.unit && !data.imports.iter().any(|import| import.unit == system) {
                levels.push(self.find_in_unit_interface(system, name));
            }
        }
        levels
    }

    /// Interface declarations of `unit` named `name`, excluding unit names.
    pub fn find_in_unit_interface(&self, unit: UnitId, name: &Name) -> Vec<DeclId> {
        let scope = self.unit(unit).scope;
        self.scope(scope)
            .find_direct(name)
            .iter()
            .copied()
            .filter(|&id| {
                let decl = self.declaration(id);
                decl.section == Section::Interface && !decl.is_unit_name()
            })
            .collect()
    }

    /// The unit a unit-name declaration stands for.
    pub fn unit_of_name(&self, decl: DeclId) -> Option<UnitId> {
        match self.declaration(decl).kind {
            DeclKind::Unit(unit) => Some(unit),
            DeclKind::UnitImport(unit) => unit,
            _ => None,
        }
    }

    /// The unit a (possibly dotted) name denotes inside `unit`: the unit
    /// itself, one of its `uses` entries, or System.
    pub fn unit_named(&self, unit: UnitId, name: &Name) -> Option<UnitId> {
        if self.unit(unit).name == *name {
            return Some(unit);
        }
        let scope = self.unit(unit).scope;
        let imported = self.scope(scope).find_direct(name).iter().find_map(|&id| match self.declaration(id).kind {
            DeclKind::UnitImport(target) => target,
            _ => None,
        });
        imported.or_else(|| self.system.filter(|&system| self.unit(system).name == *name))
    }

    /// The nearest enclosing unit scope of `scope`.
    pub fn unit_scope_of(&self, scope: ScopeId) -> ScopeId {
        self.unit(self.scope(scope).unit).scope
    }

    /// The nearest method scope at or above `scope` on the lexical chain.
    pub fn enclosing_method_scope(&self, scope: ScopeId) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let data = self.scope(id);
            if data.kind == ScopeKind::Method {
                return Some(id);
            }
            current = data.parent;
        }
        None
    }
}
