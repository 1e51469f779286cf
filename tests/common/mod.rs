//! Shared syntax-tree builders for the integration tests.
//!
//! Positions are explicit wherever a test later looks a binding up, so the
//! helpers take `(line, col)` for every identifier that matters.
#![allow(dead_code)]

use delphi_sema::ast::*;
use delphi_sema::hir::{DeclId, Location};
use delphi_sema::{AnalysisConfig, LineCol, SymbolTable, SymbolTableBuilder};

// ============================================================================
// DECLARATIONS
// ============================================================================

pub fn ident(name: &str, line: u32, col: u32) -> Ident {
    Ident::new(name, line, col)
}

/// `uses A, B.C;` with every segment on `line`, starting at column 5.
pub fn uses(line: u32, names: &[&str]) -> Vec<QualifiedIdent> {
    let mut col = 5;
    names
        .iter()
        .map(|name| {
            let parts = name
                .split('.')
                .map(|part| {
                    let ident = Ident::new(part, line, col);
                    col += part.len() as u32 + 1;
                    ident
                })
                .collect();
            col += 1;
            QualifiedIdent::new(parts).unwrap()
        })
        .collect()
}

pub fn var(name: (&str, u32, u32), ty: (&str, u32, u32)) -> DeclItem {
    DeclItem::Vars(vec![VarDecl {
        names: vec![ident(name.0, name.1, name.2)],
        ty: TypeExpr::named(ty.0, ty.1, ty.2),
        value: None,
    }])
}

pub fn struct_type(kind: StructKind, name: (&str, u32, u32), ancestors: Vec<TypeRef>, members: Vec<Member>) -> TypeDecl {
    TypeDecl {
        name: ident(name.0, name.1, name.2),
        type_params: Vec::new(),
        ty: TypeExpr::Struct(StructDecl {
            kind,
            forward: false,
            ancestors,
            members,
        }),
    }
}

/// `TName = class(Ancestor)` with the name at column 2 and the ancestor at
/// column 20 of `line`.
pub fn class(name: &str, line: u32, ancestor: Option<&str>, members: Vec<Member>) -> TypeDecl {
    let ancestors = ancestor.map(|a| TypeRef::named(a, line, 20)).into_iter().collect();
    struct_type(StructKind::Class, (name, line, 2), ancestors, members)
}

pub fn public(kind: MemberKind) -> Member {
    Member {
        visibility: Visibility::Public,
        kind,
    }
}

/// A field with its name at column 4 and its type at column 20.
pub fn field(name: &str, ty: &str, line: u32) -> MemberKind {
    MemberKind::Fields(VarDecl {
        names: vec![ident(name, line, 4)],
        ty: TypeExpr::named(ty, line, 20),
        value: None,
    })
}

/// A routine heading with its name at column 14 of `line` and the return
/// type (if any) at column 40.
pub fn heading(kind: RoutineKind, name: &str, line: u32, params: Vec<ParamGroup>, ret: Option<&str>) -> RoutineHeading {
    let mut heading = RoutineHeading::new(kind, QualifiedIdent::simple(ident(name, line, 14)));
    heading.params = params;
    heading.ret = ret.map(|ret| TypeExpr::named(ret, line, 40));
    heading
}

pub fn overload(mut heading: RoutineHeading) -> RoutineHeading {
    heading.is_overload = true;
    heading
}

pub fn param(name: (&str, u32, u32), ty: (&str, u32, u32)) -> ParamGroup {
    ParamGroup::new(vec![ident(name.0, name.1, name.2)], TypeExpr::named(ty.0, ty.1, ty.2))
}

/// `property Name: Ty read Getter;` with the name at column 13, the type
/// at column 30 and the getter at column 45.
pub fn property(name: &str, ty: &str, line: u32, read: Option<&str>) -> MemberKind {
    MemberKind::Property(PropertyDecl {
        name: ident(name, line, 13),
        params: Vec::new(),
        ty: Some(TypeExpr::named(ty, line, 30)),
        read: read.map(|r| QualifiedIdent::simple(ident(r, line, 45))),
        write: None,
        is_default: false,
    })
}

/// `property Name[Index: Integer]: Ty; default;`
pub fn default_property(name: &str, ty: &str, line: u32) -> MemberKind {
    MemberKind::Property(PropertyDecl {
        name: ident(name, line, 13),
        params: vec![param(("Index", line, 20), ("Integer", line, 27))],
        ty: Some(TypeExpr::named(ty, line, 37)),
        read: None,
        write: None,
        is_default: true,
    })
}

/// A routine implementation; `parts` are laid out at columns 10, 18, 26 ...
/// of `line` and the body's `begin` sits on `begin_line`.
pub fn routine(
    kind: RoutineKind,
    parts: &[&str],
    line: u32,
    params: Vec<ParamGroup>,
    decls: Vec<DeclItem>,
    begin_line: u32,
    stmts: Vec<Stmt>,
) -> DeclItem {
    let parts = parts
        .iter()
        .enumerate()
        .map(|(i, part)| ident(part, line, 10 + 8 * i as u32))
        .collect();
    let mut heading = RoutineHeading::new(kind, QualifiedIdent::new(parts).unwrap());
    heading.params = params;
    DeclItem::Routine(RoutineDecl {
        heading,
        body: Some(RoutineBody {
            decls,
            block: Block::new(begin_line, 0, stmts),
        }),
    })
}

pub fn assign(target: Expr, value: Expr) -> Stmt {
    Stmt::Assign { target, value }
}

// ============================================================================
// TABLE
// ============================================================================

pub fn build(units: Vec<SourceUnit>) -> SymbolTable {
    build_with(AnalysisConfig::default(), units)
}

pub fn build_with(config: AnalysisConfig, units: Vec<SourceUnit>) -> SymbolTable {
    SymbolTableBuilder::new(config)
        .add_units(units)
        .build()
        .expect("symbol table")
}

pub fn at(table: &SymbolTable, unit: &str, line: u32, col: u32) -> Location {
    let unit = table.unit_by_name(unit).expect("unit");
    Location::new(unit, LineCol::new(line, col))
}

/// The declaration introduced at a position.
pub fn declared(table: &SymbolTable, unit: &str, line: u32, col: u32) -> DeclId {
    table
        .declared_at(at(table, unit, line, col))
        .unwrap_or_else(|| panic!("nothing declared at {unit} {line}:{col}"))
}

/// The declaration the reference at a position is bound to.
pub fn resolved(table: &SymbolTable, unit: &str, line: u32, col: u32) -> Option<DeclId> {
    table.resolved_at(at(table, unit, line, col))
}

pub fn unit_names(table: &SymbolTable, units: Vec<delphi_sema::hir::UnitId>) -> Vec<String> {
    units
        .into_iter()
        .map(|unit| table.unit(unit).name.as_str().to_string())
        .collect()
}
