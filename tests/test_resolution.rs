//! End-to-end name resolution over small hand-built units.

mod common;

use common::*;
use delphi_sema::ast::*;
use delphi_sema::hir::{DeclKind, ExprResolver, NameOccurrence, ScopeKind, Search, SearchEvent, VariableKind, codes};
use delphi_sema::{AnalysisConfig, LineCol};

fn decl_kind_of(table: &delphi_sema::SymbolTable, decl: delphi_sema::hir::DeclId) -> DeclKind {
    table.declaration(decl).kind.clone()
}

// ============================================================================
// MEMBERS AND INHERITANCE
// ============================================================================

#[test]
fn test_self_member_binds_to_ancestor_field() {
    let mut unit = SourceUnit::unit("Shapes");
    unit.interface.decls.push(DeclItem::Types(vec![
        class("TBase", 3, None, vec![public(field("F", "Integer", 5))]),
        class(
            "TChild",
            7,
            Some("TBase"),
            vec![public(MemberKind::Method(heading(RoutineKind::Procedure, "Run", 9, vec![], None)))],
        ),
    ]));
    let body = vec![assign(
        Expr::name("Self", 14, 2).dot("F", 14, 7),
        Expr::int(1, 14, 12),
    )];
    unit.implementation
        .decls
        .push(routine(RoutineKind::Procedure, &["TChild", "Run"], 12, vec![], vec![], 13, body));
    let table = build(vec![unit]);

    assert_eq!(resolved(&table, "Shapes", 14, 7), Some(declared(&table, "Shapes", 5, 4)));
    assert_eq!(resolved(&table, "Shapes", 7, 20), Some(declared(&table, "Shapes", 3, 2)));
    assert_eq!(resolved(&table, "Shapes", 12, 10), Some(declared(&table, "Shapes", 7, 2)));

    let self_decl = resolved(&table, "Shapes", 14, 2).unwrap();
    assert!(matches!(
        decl_kind_of(&table, self_decl),
        DeclKind::Variable {
            kind: VariableKind::SelfValue,
            ..
        }
    ));

    let run = declared(&table, "Shapes", 9, 14);
    assert!(table.declaration(run).method().unwrap().implemented);
    assert!(table.diagnostics().is_empty(), "{:?}", table.diagnostics());
}

#[test]
fn test_local_variable_shadows_ancestor_field() {
    let mut unit = SourceUnit::unit("Shadow");
    unit.interface.decls.push(DeclItem::Types(vec![
        class("TBase", 3, None, vec![public(field("X", "Integer", 5))]),
        class(
            "TChild",
            7,
            Some("TBase"),
            vec![public(MemberKind::Method(heading(RoutineKind::Procedure, "M", 9, vec![], None)))],
        ),
    ]));
    let local = var(("X", 13, 4), ("String", 13, 8));
    let body = vec![assign(Expr::name("X", 15, 2), Expr::string("ab", 15, 7))];
    unit.implementation
        .decls
        .push(routine(RoutineKind::Procedure, &["TChild", "M"], 12, vec![], vec![local], 14, body));
    let table = build(vec![unit]);

    let bound = resolved(&table, "Shadow", 15, 2).unwrap();
    assert_eq!(bound, declared(&table, "Shadow", 13, 4));
    assert!(matches!(
        decl_kind_of(&table, bound),
        DeclKind::Variable {
            kind: VariableKind::Local,
            ..
        }
    ));
    assert!(table.usages(declared(&table, "Shadow", 5, 4)).is_empty());
}

#[test]
fn test_member_lookup_follows_ancestry_order() {
    let mut unit = SourceUnit::unit("Chain");
    unit.interface.decls.push(DeclItem::Types(vec![
        class("TA", 3, None, vec![public(field("Y", "Integer", 4))]),
        class("TB", 6, Some("TA"), vec![public(field("Y", "String", 7))]),
        class("TC", 9, Some("TB"), vec![]),
        class("TD", 11, Some("TC"), vec![public(field("Y", "Char", 12))]),
    ]));
    let table = build(vec![unit]);

    let ty = |line| {
        table
            .declaration(declared(&table, "Chain", line, 2))
            .declared_type()
            .unwrap()
    };
    let (a, c, d) = (ty(3), ty(9), ty(11));

    assert_eq!(table.find_member(c, "y"), vec![declared(&table, "Chain", 7, 4)]);
    assert_eq!(table.find_member(d, "Y"), vec![declared(&table, "Chain", 12, 4)]);
    assert_eq!(table.find_member(a, "Y"), vec![declared(&table, "Chain", 4, 4)]);
    assert!(table.find_member(a, "Z").is_empty());
    assert_eq!(table.types().inheritance_distance(d, a), Some(3));
    assert_eq!(table.types().image(c), "Chain.TC");
}

#[test]
fn test_generic_member_type_is_substituted() {
    let mut unit = SourceUnit::unit("Gen");
    let mut boxed = class("TBox", 3, None, vec![public(field("Value", "T", 5))]);
    boxed.type_params = vec![ident("T", 3, 7)];
    unit.interface.decls.push(DeclItem::Types(vec![boxed]));
    unit.interface.decls.push(DeclItem::Vars(vec![VarDecl {
        names: vec![ident("B", 8, 4)],
        ty: TypeExpr::Named(TypeRef {
            path: QualifiedIdent::simple(ident("TBox", 8, 7)),
            args: vec![TypeExpr::named("Integer", 8, 12)],
        }),
        value: None,
    }]));
    let table = build(vec![unit]);

    let b = table.declaration(declared(&table, "Gen", 8, 4));
    let b_type = b.value_type().unwrap();
    assert_eq!(table.types().image(b_type), "Gen.TBox<Integer>");

    let unit = table.unit_by_name("Gen").unwrap();
    let scope = table.unit(unit).scope;
    let expr = Expr::name("B", 20, 0).dot("Value", 20, 2);
    let ty = ExprResolver::new(&table, unit).type_of(&expr, scope);
    assert_eq!(table.types().image(ty), "Integer");
}

// ============================================================================
// LOOPS AND INDEXING
// ============================================================================

fn enumerable_unit() -> SourceUnit {
    let mut unit = SourceUnit::unit("Coll");
    unit.interface.decls.push(DeclItem::Types(vec![
        class(
            "TEnumerator",
            3,
            None,
            vec![
                public(MemberKind::Method(heading(RoutineKind::Function, "MoveNext", 5, vec![], Some("Boolean")))),
                public(property("Current", "Integer", 6, None)),
            ],
        ),
        class(
            "TEnumerable",
            8,
            None,
            vec![
                Member {
                    visibility: Visibility::Private,
                    kind: field("FCount", "Integer", 10),
                },
                public(MemberKind::Method(heading(
                    RoutineKind::Function,
                    "GetEnumerator",
                    12,
                    vec![],
                    Some("TEnumerator"),
                ))),
                public(property("Count", "Integer", 13, Some("FCount"))),
                public(default_property("Items", "Integer", 14)),
            ],
        ),
    ]));

    // for I := 0 to E.Count - 1 do O := E[I];
    let count = Expr::binary(
        BinaryOperator::Subtract,
        Expr::name("E", 21, 16).dot("Count", 21, 18),
        Expr::int(1, 21, 26),
    );
    let body = assign(
        Expr::name("O", 22, 4),
        Expr::name("E", 22, 9).index(vec![Expr::name("I", 22, 11)]),
    );
    let stmt = Stmt::ForTo {
        var: ForVar::Reference(ident("I", 21, 6)),
        start: Expr::int(0, 21, 11),
        end: count,
        downto: false,
        body: Box::new(body),
    };
    let locals = DeclItem::Vars(vec![VarDecl {
        names: vec![ident("I", 19, 2), ident("O", 19, 5)],
        ty: TypeExpr::named("Integer", 19, 8),
        value: None,
    }]);
    unit.implementation.decls.push(routine(
        RoutineKind::Procedure,
        &["Check"],
        17,
        vec![param(("E", 17, 16), ("TEnumerable", 17, 19))],
        vec![locals],
        20,
        vec![stmt],
    ));
    unit
}

#[test]
fn test_counted_loop_over_enumerable() {
    let table = build(vec![enumerable_unit()]);
    let i = declared(&table, "Coll", 19, 2);

    assert_eq!(resolved(&table, "Coll", 21, 18), Some(declared(&table, "Coll", 13, 13)));
    assert_eq!(resolved(&table, "Coll", 21, 16), Some(declared(&table, "Coll", 17, 16)));
    assert_eq!(resolved(&table, "Coll", 22, 9), Some(declared(&table, "Coll", 17, 16)));
    assert_eq!(resolved(&table, "Coll", 21, 6), Some(i));
    assert_eq!(resolved(&table, "Coll", 22, 11), Some(i));
    assert_eq!(resolved(&table, "Coll", 22, 4), Some(declared(&table, "Coll", 19, 5)));
    assert_eq!(resolved(&table, "Coll", 13, 45), Some(declared(&table, "Coll", 10, 4)));

    let in_body = table.usages(i).iter().filter(|usage| usage.pos.line == 22).count();
    assert_eq!(in_body, 1);
    assert!(table.diagnostics().is_empty(), "{:?}", table.diagnostics());
}

#[test]
fn test_default_property_types_indexing() {
    let table = build(vec![enumerable_unit()]);
    let unit = table.unit_by_name("Coll").unwrap();
    let scope = table.node_scope(at(&table, "Coll", 17, 10)).unwrap();

    let mut resolver = ExprResolver::new(&table, unit);
    let element = Expr::name("E", 30, 0).index(vec![Expr::name("I", 30, 2)]);
    assert_eq!(table.types().image(resolver.type_of(&element, scope)), "Integer");

    let upper = Expr::binary(
        BinaryOperator::Subtract,
        Expr::name("E", 31, 0).dot("Count", 31, 2),
        Expr::int(1, 31, 10),
    );
    assert_eq!(table.types().image(resolver.type_of(&upper, scope)), "Integer");
    assert!(resolver.references().iter().any(|(location, _)| location.pos == LineCol::new(31, 2)));
}

#[test]
fn test_for_in_infers_loop_variable_and_depends_on_enumerator_unit() {
    let mut lists = SourceUnit::unit("Lists");
    lists.interface.decls.push(DeclItem::Types(vec![
        class(
            "TListEnum",
            3,
            None,
            vec![
                public(MemberKind::Method(heading(RoutineKind::Function, "MoveNext", 5, vec![], Some("Boolean")))),
                public(property("Current", "Integer", 6, None)),
            ],
        ),
        class(
            "TBaseList",
            8,
            None,
            vec![public(MemberKind::Method(heading(
                RoutineKind::Function,
                "GetEnumerator",
                10,
                vec![],
                Some("TListEnum"),
            )))],
        ),
    ]));

    let mut derived = SourceUnit::unit("Derived");
    derived.interface.uses = uses(2, &["Lists"]);
    derived
        .interface
        .decls
        .push(DeclItem::Types(vec![class("TDerived", 4, Some("TBaseList"), vec![])]));

    let mut app = SourceUnit::program("App");
    app.implementation.uses = uses(1, &["Derived"]);
    app.implementation
        .decls
        .push(var(("L", 3, 4), ("TDerived", 3, 8)));
    app.initialization = Some(Block::new(
        5,
        0,
        vec![Stmt::ForIn {
            var: ForVar::Declaration {
                name: ident("X", 6, 10),
                ty: None,
            },
            collection: Expr::name("L", 6, 15),
            body: Box::new(Stmt::Compound(Block::new(6, 20, vec![]))),
        }],
    ));
    let table = build(vec![lists, derived, app]);

    let x = table.declaration(declared(&table, "App", 6, 10));
    assert_eq!(table.types().image(x.value_type().unwrap()), "Integer");

    let app = table.unit_by_name("App").unwrap();
    assert!(table.interface_dependencies(app).is_empty());
    assert_eq!(
        unit_names(&table, table.implementation_dependencies(app)),
        vec!["Derived", "Lists"]
    );
}

// ============================================================================
// DEPENDENCIES AND UNITS
// ============================================================================

#[test]
fn test_interface_and_implementation_dependencies() {
    let mut base = SourceUnit::unit("Base");
    base.interface
        .decls
        .push(DeclItem::Types(vec![class("TThing", 3, None, vec![])]));
    base.interface.decls.push(var(("Shared", 5, 4), ("Integer", 5, 12)));

    let mut extra = SourceUnit::unit("Extra");
    extra.interface.decls.push(var(("Value", 3, 4), ("Integer", 3, 11)));

    let mut middle = SourceUnit::unit("Middle");
    middle.interface.uses = uses(2, &["Base"]);
    middle
        .interface
        .decls
        .push(DeclItem::Types(vec![class("TUser", 4, Some("TThing"), vec![])]));
    middle.implementation.uses = uses(7, &["Extra"]);
    let body = vec![assign(
        Expr::name("Extra", 11, 2).dot("Value", 11, 8),
        Expr::name("Shared", 11, 17),
    )];
    middle
        .implementation
        .decls
        .push(routine(RoutineKind::Procedure, &["P"], 9, vec![], vec![], 10, body));
    let table = build(vec![middle, extra, base]);

    let middle = table.unit_by_name("Middle").unwrap();
    assert_eq!(unit_names(&table, table.interface_dependencies(middle)), vec!["Base"]);
    assert_eq!(unit_names(&table, table.implementation_dependencies(middle)), vec!["Extra"]);

    let base = table.unit_by_name("Base").unwrap();
    assert!(table.interface_dependencies(base).is_empty());
    assert!(table.implementation_dependencies(base).is_empty());

    assert_eq!(resolved(&table, "Middle", 11, 8), Some(declared(&table, "Extra", 3, 4)));
    assert_eq!(resolved(&table, "Middle", 11, 17), Some(declared(&table, "Base", 5, 4)));
}

#[test]
fn test_uses_entries_resolve_through_scope_names_and_aliases() {
    let mut forms = SourceUnit::unit("Vcl.Forms");
    forms.interface.decls.push(var(("Application", 3, 4), ("Integer", 3, 17)));
    let windows = SourceUnit::unit("Winapi.Windows");

    let mut app = SourceUnit::program("App");
    app.implementation.uses = uses(1, &["Forms", "WinTypes"]);
    app.initialization = Some(Block::new(
        4,
        0,
        vec![assign(
            Expr::name("Forms", 5, 2).dot("Application", 5, 8),
            Expr::int(0, 5, 23),
        )],
    ));
    let config = AnalysisConfig::new()
        .with_unit_scope_name("Vcl")
        .with_unit_alias("WinTypes", "Winapi.Windows");
    let table = build_with(config, vec![forms, windows, app]);

    assert!(table.diagnostics().is_empty(), "{:?}", table.diagnostics());
    assert_eq!(resolved(&table, "App", 5, 8), Some(declared(&table, "Vcl.Forms", 3, 4)));

    let forms_id = table.unit_by_name("vcl.forms").unwrap();
    let import = resolved(&table, "App", 5, 2).unwrap();
    assert_eq!(decl_kind_of(&table, import), DeclKind::UnitImport(Some(forms_id)));

    let windows_id = table.unit_by_name("Winapi.Windows").unwrap();
    let alias = declared(&table, "App", 1, 12);
    assert_eq!(decl_kind_of(&table, alias), DeclKind::UnitImport(Some(windows_id)));
}

#[test]
fn test_unknown_unit_is_reported() {
    let mut app = SourceUnit::program("App");
    app.implementation.uses = uses(1, &["Gone"]);
    let table = build(vec![app]);

    let diagnostics = table.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code.as_deref(), Some(codes::UNKNOWN_UNIT));
    assert_eq!(diagnostics[0].location, at(&table, "App", 1, 5));
    assert_eq!(decl_kind_of(&table, declared(&table, "App", 1, 5)), DeclKind::UnitImport(None));
}

#[test]
fn test_circular_interface_uses_are_reported_once() {
    let mut a = SourceUnit::unit("A");
    a.interface.uses = uses(2, &["B"]);
    let mut b = SourceUnit::unit("B");
    b.interface.uses = uses(2, &["A"]);
    let mut c = SourceUnit::unit("C");
    c.implementation.uses = uses(4, &["D"]);
    let mut d = SourceUnit::unit("D");
    d.implementation.uses = uses(4, &["C"]);
    let table = build(vec![a, b, c, d]);

    let circular: Vec<_> = table
        .diagnostics()
        .iter()
        .filter(|d| d.code.as_deref() == Some(codes::CIRCULAR_UNIT_REFERENCE))
        .collect();
    assert_eq!(circular.len(), 1);
    assert!(table.diagnostics().iter().all(|d| d.code.as_deref() != Some(codes::UNKNOWN_UNIT)));
}

// ============================================================================
// DIAGNOSTICS
// ============================================================================

#[test]
fn test_unresolved_name_is_reported_and_left_unbound() {
    let mut app = SourceUnit::program("App");
    app.initialization = Some(Block::new(
        3,
        0,
        vec![assign(Expr::name("Missing", 4, 2), Expr::int(1, 4, 13))],
    ));
    let table = build(vec![app]);

    assert_eq!(resolved(&table, "App", 4, 2), None);
    let diagnostics = table.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code.as_deref(), Some(codes::UNRESOLVED_NAME));
    assert_eq!(diagnostics[0].location, at(&table, "App", 4, 2));
    assert!(diagnostics[0].message.contains("Missing"));
}

#[test]
fn test_duplicate_declaration_is_reported() {
    let mut unit = SourceUnit::unit("Dup");
    unit.interface.decls.push(var(("X", 3, 4), ("Integer", 3, 7)));
    unit.interface.decls.push(var(("X", 4, 4), ("String", 4, 7)));
    let table = build(vec![unit]);

    let duplicates: Vec<_> = table
        .diagnostics()
        .iter()
        .filter(|d| d.code.as_deref() == Some(codes::DUPLICATE_DECLARATION))
        .collect();
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].location, at(&table, "Dup", 4, 4));
}

// ============================================================================
// SEARCH TERMINATION
// ============================================================================

/// `Lib` declares `TBase`; `Deep` imports it, derives `TMid` and `TLeaf`,
/// and implements `TLeaf.Run` with a nested block around a `for var` loop.
fn deep_units() -> Vec<SourceUnit> {
    let mut lib = SourceUnit::unit("Lib");
    lib.interface
        .decls
        .push(DeclItem::Types(vec![class("TBase", 3, None, vec![public(field("X", "Integer", 4))])]));

    let mut deep = SourceUnit::unit("Deep");
    deep.interface.uses = uses(2, &["Lib"]);
    deep.interface.decls.push(DeclItem::Types(vec![
        class("TMid", 4, Some("TBase"), vec![]),
        class(
            "TLeaf",
            6,
            Some("TMid"),
            vec![public(MemberKind::Method(heading(RoutineKind::Procedure, "Run", 7, vec![], None)))],
        ),
    ]));

    // begin begin for var I := 0 to 1 do begin X := I end end end
    let inner = Stmt::Compound(Block::new(
        15,
        30,
        vec![assign(Expr::name("X", 16, 6), Expr::name("I", 16, 11))],
    ));
    let counted = Stmt::ForTo {
        var: ForVar::Declaration {
            name: ident("I", 15, 12),
            ty: Some(TypeExpr::named("Integer", 15, 15)),
        },
        start: Expr::int(0, 15, 26),
        end: Expr::int(1, 15, 28),
        downto: false,
        body: Box::new(inner),
    };
    let outer = Stmt::Compound(Block::new(14, 2, vec![counted]));
    deep.implementation
        .decls
        .push(routine(RoutineKind::Procedure, &["TLeaf", "Run"], 12, vec![], vec![], 13, vec![outer]));
    vec![lib, deep]
}

#[test]
fn test_absent_name_search_ends_empty_after_the_whole_chain() {
    let table = build(deep_units());
    assert!(table.diagnostics().is_empty(), "{:?}", table.diagnostics());
    assert_eq!(resolved(&table, "Deep", 16, 6), Some(declared(&table, "Lib", 4, 4)));
    assert_eq!(resolved(&table, "Deep", 16, 11), Some(declared(&table, "Deep", 15, 12)));

    let innermost = table.node_scope(at(&table, "Deep", 15, 30)).unwrap();
    assert_eq!(table.scope(innermost).kind, ScopeKind::Block);

    let mut events = Vec::new();
    let mut sink = |event: &SearchEvent| events.push(*event);
    let found = Search::new(&table)
        .with_trace(&mut sink)
        .execute(&NameOccurrence::new("Nowhere"), innermost);

    assert!(found.is_empty());
    assert!(events.iter().all(|e| !matches!(e, SearchEvent::Found { .. })));

    // TLeaf, TMid and TBase are all checked on the way out of the method.
    let type_scopes = events
        .iter()
        .filter(|e| matches!(e, SearchEvent::CheckingTypeScope(_)))
        .count();
    assert!(type_scopes >= 3, "{events:?}");

    let deep = table.unit_by_name("Deep").unwrap();
    let last_checked = events.iter().rev().find_map(|e| match e {
        SearchEvent::CheckingScope(scope) => Some(*scope),
        _ => None,
    });
    assert_eq!(last_checked, Some(table.unit(deep).scope));
    assert!(table.diagnostics().is_empty());
}

// ============================================================================
// OVERLOADS
// ============================================================================

fn forward(heading: delphi_sema::ast::RoutineHeading) -> DeclItem {
    DeclItem::Routine(RoutineDecl { heading, body: None })
}

#[test]
fn test_overloads_prefer_the_better_match_over_the_nearer_one() {
    let mut logging = SourceUnit::unit("Logging");
    logging.interface.decls.push(forward(overload(heading(
        RoutineKind::Procedure,
        "Log",
        3,
        vec![param(("V", 3, 18), ("Integer", 3, 21))],
        None,
    ))));

    let mut app = SourceUnit::program("App");
    app.implementation.uses = uses(1, &["Logging"]);
    app.implementation.decls.push(DeclItem::Routine(RoutineDecl {
        heading: overload(heading(
            RoutineKind::Procedure,
            "Log",
            3,
            vec![param(("V", 3, 18), ("Int64", 3, 21))],
            None,
        )),
        body: Some(RoutineBody {
            decls: vec![],
            block: Block::new(4, 0, vec![]),
        }),
    }));
    app.initialization = Some(Block::new(
        6,
        0,
        vec![
            Stmt::Call(Expr::name("Log", 7, 2).call(vec![Expr::int(5, 7, 6)])),
            Stmt::Call(Expr::name("Log", 8, 2).call(vec![Expr::int(5_000_000_000, 8, 6)])),
        ],
    ));
    let table = build(vec![logging, app]);

    assert_eq!(resolved(&table, "App", 7, 2), Some(declared(&table, "Logging", 3, 14)));
    assert_eq!(resolved(&table, "App", 8, 2), Some(declared(&table, "App", 3, 14)));
    assert!(table.diagnostics().is_empty(), "{:?}", table.diagnostics());

    let app = table.unit_by_name("App").unwrap();
    assert_eq!(unit_names(&table, table.implementation_dependencies(app)), vec!["Logging"]);
}

#[test]
fn test_equally_good_overloads_are_ambiguous_but_still_bound() {
    let two = |line: u32, first: &str, second: &str| {
        DeclItem::Routine(RoutineDecl {
            heading: overload(heading(
                RoutineKind::Procedure,
                "F",
                line,
                vec![
                    param(("A", line, 16), (first, line, 19)),
                    param(("B", line, 28), (second, line, 31)),
                ],
                None,
            )),
            body: Some(RoutineBody {
                decls: vec![],
                block: Block::new(line + 1, 0, vec![]),
            }),
        })
    };
    let mut app = SourceUnit::program("App");
    app.implementation.decls.push(two(3, "Integer", "Int64"));
    app.implementation.decls.push(two(6, "Int64", "Integer"));
    app.initialization = Some(Block::new(
        9,
        0,
        vec![Stmt::Call(
            Expr::name("F", 10, 2).call(vec![Expr::int(1, 10, 4), Expr::int(1, 10, 7)]),
        )],
    ));
    let table = build(vec![app]);

    assert_eq!(resolved(&table, "App", 10, 2), Some(declared(&table, "App", 3, 14)));
    let diagnostics = table.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code.as_deref(), Some(codes::AMBIGUOUS_CALL));
    assert_eq!(diagnostics[0].related.len(), 1);
    assert_eq!(diagnostics[0].related[0].location, at(&table, "App", 6, 14));
}

#[test]
fn test_parallel_and_sequential_builds_agree() {
    let sequential = build_with(AnalysisConfig::new().with_parallel(false), vec![enumerable_unit()]);
    let parallel = build_with(AnalysisConfig::new().with_parallel(true), vec![enumerable_unit()]);

    for (line, col) in [(21, 6), (21, 16), (21, 18), (22, 4), (22, 9), (22, 11)] {
        let a = resolved(&sequential, "Coll", line, col).map(|id| sequential.declaration(id).location.pos);
        let b = resolved(&parallel, "Coll", line, col).map(|id| parallel.declaration(id).location.pos);
        assert_eq!(a, b, "binding at {line}:{col}");
    }
}
