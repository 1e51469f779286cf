//! Structural and interface-based `for ... in` support.

mod common;

use common::*;
use delphi_sema::SymbolTable;
use delphi_sema::ast::*;
use delphi_sema::hir::TypeId;
use delphi_sema::hir::enumerable::{current_property, get_enumerator, is_enumerable, is_enumerator};

fn type_named(table: &SymbolTable, unit: &str, line: u32) -> TypeId {
    table
        .declaration(declared(table, unit, line, 2))
        .declared_type()
        .unwrap()
}

fn enumerator(name: &str, line: u32, move_next: Visibility) -> TypeDecl {
    class(
        name,
        line,
        None,
        vec![
            Member {
                visibility: move_next,
                kind: MemberKind::Method(heading(
                    RoutineKind::Function,
                    "MoveNext",
                    line + 1,
                    vec![],
                    Some("Boolean"),
                )),
            },
            public(property("Current", "String", line + 2, None)),
        ],
    )
}

fn collection(name: &str, line: u32, enumerator: &str) -> TypeDecl {
    class(
        name,
        line,
        None,
        vec![public(MemberKind::Method(heading(
            RoutineKind::Function,
            "GetEnumerator",
            line + 1,
            vec![],
            Some(enumerator),
        )))],
    )
}

#[test]
fn test_structural_enumerable() {
    let mut unit = SourceUnit::unit("Shapes");
    unit.interface.decls.push(DeclItem::Types(vec![
        enumerator("TWordEnum", 3, Visibility::Public),
        collection("TWords", 7, "TWordEnum"),
    ]));
    let table = build(vec![unit]);

    let words = type_named(&table, "Shapes", 7);
    let word_enum = type_named(&table, "Shapes", 3);
    assert!(is_enumerator(&table, word_enum));
    assert!(is_enumerable(&table, words));
    assert!(!is_enumerable(&table, word_enum));
    assert_eq!(get_enumerator(&table, words), Some(declared(&table, "Shapes", 8, 14)));
    assert_eq!(current_property(&table, word_enum), Some(declared(&table, "Shapes", 5, 13)));
}

#[test]
fn test_private_move_next_is_not_an_enumerator() {
    let mut unit = SourceUnit::unit("Hidden");
    unit.interface.decls.push(DeclItem::Types(vec![
        enumerator("TSecretEnum", 3, Visibility::Private),
        collection("TSecrets", 7, "TSecretEnum"),
    ]));
    let table = build(vec![unit]);

    assert!(!is_enumerator(&table, type_named(&table, "Hidden", 3)));
    assert!(!is_enumerable(&table, type_named(&table, "Hidden", 7)));
}

#[test]
fn test_get_enumerator_with_required_parameter_does_not_count() {
    let mut unit = SourceUnit::unit("Params");
    let with_param = class(
        "TOdd",
        7,
        None,
        vec![public(MemberKind::Method(heading(
            RoutineKind::Function,
            "GetEnumerator",
            8,
            vec![param(("Start", 8, 28), ("Integer", 8, 35))],
            Some("TOddEnum"),
        )))],
    );
    unit.interface.decls.push(DeclItem::Types(vec![
        enumerator("TOddEnum", 3, Visibility::Public),
        with_param,
    ]));
    let table = build(vec![unit]);

    let odd = type_named(&table, "Params", 7);
    assert_eq!(get_enumerator(&table, odd), None);
    assert!(!is_enumerable(&table, odd));
}

#[test]
fn test_enumerable_interface_counts_without_shape() {
    let mut system = SourceUnit::unit("System");
    system.interface.decls.push(DeclItem::Types(vec![struct_type(
        StructKind::Interface,
        ("IEnumerable", 3, 2),
        vec![],
        vec![],
    )]));

    let mut bag = SourceUnit::unit("Bags");
    bag.interface
        .decls
        .push(DeclItem::Types(vec![class("TBag", 3, Some("IEnumerable"), vec![])]));
    let table = build(vec![system, bag]);

    let bag = type_named(&table, "Bags", 3);
    assert!(table.types().is_subtype_of_name(bag, "System.IEnumerable"));
    assert!(is_enumerable(&table, bag));
    assert_eq!(get_enumerator(&table, bag), None);
}

#[test]
fn test_for_in_over_string_yields_char() {
    let mut app = SourceUnit::program("App");
    app.implementation.decls.push(var(("S", 2, 4), ("String", 2, 7)));
    app.initialization = Some(Block::new(
        4,
        0,
        vec![Stmt::ForIn {
            var: ForVar::Declaration {
                name: ident("C", 5, 10),
                ty: None,
            },
            collection: Expr::name("S", 5, 15),
            body: Box::new(Stmt::Compound(Block::new(5, 20, vec![]))),
        }],
    ));
    let table = build(vec![app]);

    let c = table.declaration(declared(&table, "App", 5, 10));
    assert_eq!(table.types().image(c.value_type().unwrap()), "Char");
}
