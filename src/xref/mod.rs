//! Cross references over a built [`SymbolTable`].
//!
//! Editor-style queries answered from the table's indexes: what is declared
//! or referenced at a position, where a declaration is used, and which units
//! a unit depends on. Every function is pure and returns crate types; turning
//! them into protocol messages is the caller's business.

use std::fmt;

use crate::base::Name;
use crate::hir::{DeclId, DeclKind, Location, SymbolTable, UnitId};

/// Where a name leads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GotoTarget {
    pub decl: DeclId,
    pub name: Name,
    /// The declaring position (the unit name itself for unit references).
    pub location: Location,
}

/// The declaration introduced at `location`, if a declaration starts there.
pub fn declaration_at(table: &SymbolTable, location: Location) -> Option<DeclId> {
    table.declared_at(location)
}

/// Every position that references `decl`, ordered by unit and position.
pub fn find_usages(table: &SymbolTable, decl: DeclId) -> Vec<Location> {
    let mut usages = table.usages(decl).to_vec();
    usages.sort();
    usages
}

/// The declaration the identifier at `location` stands for.
///
/// A reference leads to what it was bound to; a declaring identifier leads
/// to its own declaration. `uses` entries lead to the imported unit.
pub fn goto_definition(table: &SymbolTable, location: Location) -> Option<GotoTarget> {
    let decl = table.resolved_at(location).or_else(|| table.declared_at(location))?;
    let decl = match table.declaration(decl).kind {
        DeclKind::UnitImport(Some(unit)) => table.unit(unit).declaration,
        _ => decl,
    };
    let declaration = table.declaration(decl);
    Some(GotoTarget {
        decl,
        name: declaration.name.clone(),
        location: declaration.location,
    })
}

/// The units one unit depends on, split by section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencyReport {
    pub unit: Name,
    /// Units referenced from the interface section, in order of first reference.
    pub interface: Vec<Name>,
    /// Units referenced only from the implementation section.
    pub implementation: Vec<Name>,
    /// `uses` entries naming units that were never supplied.
    pub missing: Vec<Name>,
}

pub fn dependency_report(table: &SymbolTable, unit: UnitId) -> DependencyReport {
    let names = |units: Vec<UnitId>| units.into_iter().map(|id| table.unit(id).name.clone()).collect();
    let scope = table.scope(table.unit(unit).scope);
    let missing = scope
        .declarations()
        .map(|id| table.declaration(id))
        .filter(|decl| matches!(decl.kind, DeclKind::UnitImport(None)))
        .map(|decl| decl.name.clone())
        .collect();

    DependencyReport {
        unit: table.unit(unit).name.clone(),
        interface: names(table.interface_dependencies(unit)),
        implementation: names(table.implementation_dependencies(unit)),
        missing,
    }
}

impl fmt::Display for DependencyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |names: &[Name]| names.iter().map(Name::as_str).collect::<Vec<_>>().join(", ");
        writeln!(f, "{}", self.unit)?;
        writeln!(f, "  interface: {}", join(&self.interface))?;
        write!(f, "  implementation: {}", join(&self.implementation))?;
        if !self.missing.is_empty() {
            write!(f, "\n  missing: {}", join(&self.missing))?;
        }
        Ok(())
    }
}
