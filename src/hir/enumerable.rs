//! Enumerable and enumerator detection.
//!
//! A type can be iterated with `for ... in` when it implements
//! `System.IEnumerable`, or when it simply has the right shape: a public
//! `GetEnumerator` method returning an enumerator. An enumerator is a type
//! implementing `System.IEnumerator`, or one with a public
//! `MoveNext: Boolean` method and a public `Current` property.
//!
//! Shape checks look at the type's own members only, matched ignoring case.

use super::decl::DeclKind;
use super::ids::{DeclId, TypeId};
use super::table::SymbolTable;

const ENUMERABLE_INTERFACE: &str = "System.IEnumerable";
const ENUMERATOR_INTERFACE: &str = "System.IEnumerator";

/// Whether `ty` can be the collection of a `for ... in` loop.
pub fn is_enumerable(table: &SymbolTable, ty: TypeId) -> bool {
    if table.types().is_subtype_of_name(ty, ENUMERABLE_INTERFACE) {
        return true;
    }
    get_enumerator(table, ty).is_some_and(|method| {
        table
            .declaration(method)
            .value_type()
            .is_some_and(|enumerator| is_enumerator(table, enumerator))
    })
}

/// Whether `ty` has the enumerator protocol.
pub fn is_enumerator(table: &SymbolTable, ty: TypeId) -> bool {
    if table.types().is_subtype_of_name(ty, ENUMERATOR_INTERFACE) {
        return true;
    }
    let moves = public_members(table, ty, "MoveNext").any(|id| {
        let decl = table.declaration(id);
        decl.method()
            .is_some_and(|method| method.params.is_empty() && table.types().is_boolean(method.return_type))
    });
    moves && current_property(table, ty).is_some()
}

/// The public parameterless `GetEnumerator` method declared by `ty`.
pub fn get_enumerator(table: &SymbolTable, ty: TypeId) -> Option<DeclId> {
    public_members(table, ty, "GetEnumerator").find(|&id| {
        table
            .declaration(id)
            .method()
            .is_some_and(|method| method.required_params() == 0 && !table.types().is_void(method.return_type))
    })
}

/// The public `Current` property of an enumerator type.
pub fn current_property(table: &SymbolTable, ty: TypeId) -> Option<DeclId> {
    public_members(table, ty, "Current").find(|&id| match &table.declaration(id).kind {
        DeclKind::Property(property) => !table.types().is_void(property.ty),
        _ => false,
    })
}

fn public_members<'t>(table: &'t SymbolTable, ty: TypeId, name: &'t str) -> impl Iterator<Item = DeclId> + 't {
    let scope = table.types().struct_type(ty).map(|data| data.scope);
    scope
        .into_iter()
        .flat_map(move |scope| table.scope(scope).declarations())
        .filter(move |&id| {
            let decl = table.declaration(id);
            decl.visibility.is_public() && decl.name.eq_ignore_case(name)
        })
}
