//! Units and their dependency sets.

use indexmap::IndexSet;

use super::decl::Section;
use super::ids::{DeclId, ScopeId, UnitId};
use crate::ast::UnitKind;
use crate::base::Name;

#[derive(Clone, Debug)]
pub struct Unit {
    pub name: Name,
    pub kind: UnitKind,
    pub scope: ScopeId,
    /// The declaration of the unit name inside its own scope.
    pub declaration: DeclId,
    /// The built-in System unit.
    pub is_system: bool,
    interface_dependencies: IndexSet<UnitId>,
    implementation_dependencies: IndexSet<UnitId>,
}

impl Unit {
    pub(crate) fn new(name: Name, kind: UnitKind, scope: ScopeId, declaration: DeclId) -> Self {
        Self {
            name,
            kind,
            scope,
            declaration,
            is_system: false,
            interface_dependencies: IndexSet::new(),
            implementation_dependencies: IndexSet::new(),
        }
    }

    /// Units whose declarations were referenced from the interface section,
    /// in order of first reference.
    pub fn interface_dependencies(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.interface_dependencies.iter().copied()
    }

    /// Units referenced only from the implementation section.
    pub fn implementation_dependencies(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.implementation_dependencies.iter().copied()
    }

    /// Record that a reference in `section` bound to a declaration of `unit`.
    ///
    /// A unit already in the interface set is never added to the
    /// implementation set.
    pub(crate) fn add_dependency(&mut self, unit: UnitId, section: Section) {
        match section {
            Section::Interface => {
                self.implementation_dependencies.shift_remove(&unit);
                self.interface_dependencies.insert(unit);
            }
            Section::Implementation => {
                if !self.interface_dependencies.contains(&unit) {
                    self.implementation_dependencies.insert(unit);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Unit {
        Unit::new(Name::new("Foo"), UnitKind::Unit, ScopeId::new(0), DeclId::new(0))
    }

    #[test]
    fn test_dependencies_keep_first_reference_order() {
        let mut unit = unit();
        unit.add_dependency(UnitId::new(3), Section::Implementation);
        unit.add_dependency(UnitId::new(2), Section::Implementation);
        unit.add_dependency(UnitId::new(3), Section::Implementation);

        let deps: Vec<_> = unit.implementation_dependencies().collect();
        assert_eq!(deps, vec![UnitId::new(3), UnitId::new(2)]);
    }

    #[test]
    fn test_interface_dependency_wins() {
        let mut unit = unit();
        unit.add_dependency(UnitId::new(2), Section::Implementation);
        unit.add_dependency(UnitId::new(2), Section::Interface);
        unit.add_dependency(UnitId::new(2), Section::Implementation);

        assert_eq!(unit.interface_dependencies().collect::<Vec<_>>(), vec![UnitId::new(2)]);
        assert_eq!(unit.implementation_dependencies().count(), 0);
    }
}
