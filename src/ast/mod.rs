//! Read-only syntax tree handed over by the parser.
//!
//! The parser itself lives outside this crate. What it produces is a closed
//! tree of tagged variants: each node kind carries only its own fields, and
//! consumers navigate it by pattern matching. The resolver never mutates the
//! tree; everything it learns (bindings, scopes, types) is recorded in the
//! [`SymbolTable`](crate::hir::SymbolTable) keyed by identifier position.
//!
//! ## Layout
//!
//! - [`SourceUnit`] - one `unit` or `program` file
//! - [`DeclItem`] / [`TypeExpr`] / [`RoutineDecl`] - declarations
//! - [`Stmt`] / [`Expr`] - statements and expressions (see [`expr`])
//! - [`visit`] - visitor with default walks and descendant queries

mod expr;
pub mod visit;

pub use expr::{BinaryOperator, Block, Expr, ForVar, Literal, Stmt, UnaryOperator};

use crate::base::{LineCol, Name};

/// An identifier token with its position.
#[derive(Clone, Debug, PartialEq)]
pub struct Ident {
    pub name: Name,
    pub pos: LineCol,
}

impl Ident {
    /// Create an identifier at a 0-indexed line/column.
    pub fn new(text: &str, line: u32, col: u32) -> Self {
        Self {
            name: Name::new(text),
            pos: LineCol::new(line, col),
        }
    }
}

/// A dotted identifier (`System.SysUtils`, `TFoo.Bar`).
///
/// The last segment is held apart, so there is always one.
#[derive(Clone, Debug, PartialEq)]
pub struct QualifiedIdent {
    qualifier: Vec<Ident>,
    last: Ident,
}

impl QualifiedIdent {
    /// `None` when `parts` is empty.
    pub fn new(mut parts: Vec<Ident>) -> Option<Self> {
        let last = parts.pop()?;
        Some(Self { qualifier: parts, last })
    }

    /// A single-part identifier.
    pub fn simple(ident: Ident) -> Self {
        Self {
            qualifier: Vec::new(),
            last: ident,
        }
    }

    /// Split `text` on dots, placing every segment at `line:col`.
    pub fn dotted(text: &str, line: u32, col: u32) -> Self {
        let (qualifier, last) = match text.rsplit_once('.') {
            Some((qualifier, last)) => (qualifier.split('.').map(|s| Ident::new(s, line, col)).collect(), last),
            None => (Vec::new(), text),
        };
        Self {
            qualifier,
            last: Ident::new(last, line, col),
        }
    }

    /// Every segment, first to last.
    pub fn parts(&self) -> impl DoubleEndedIterator<Item = &Ident> {
        self.qualifier.iter().chain(std::iter::once(&self.last))
    }

    /// The whole dotted name.
    pub fn name(&self) -> Name {
        let text: Vec<&str> = self.parts().map(|p| p.name.as_str()).collect();
        Name::new(text.join("."))
    }

    /// The last segment (the declared or referenced identifier).
    pub fn last(&self) -> &Ident {
        &self.last
    }

    /// Position of the first segment.
    pub fn pos(&self) -> LineCol {
        self.qualifier.first().unwrap_or(&self.last).pos
    }

    /// All segments but the last.
    pub fn qualifier(&self) -> &[Ident] {
        &self.qualifier
    }

    /// The qualifier as an identifier of its own: `TOuter.TFoo` for
    /// `TOuter.TFoo.Bar`, `None` for a single segment.
    pub fn qualifier_path(&self) -> Option<Self> {
        Self::new(self.qualifier.clone())
    }

    pub fn is_qualified(&self) -> bool {
        !self.qualifier.is_empty()
    }
}

/// `unit` or `program`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Unit,
    Program,
}

/// One source file.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceUnit {
    pub kind: UnitKind,
    pub name: QualifiedIdent,
    /// Empty for programs.
    pub interface: Section,
    /// For programs, the declarations before the main block.
    pub implementation: Section,
    /// For programs, the main block.
    pub initialization: Option<Block>,
    pub finalization: Option<Block>,
}

impl SourceUnit {
    /// An empty unit with the given (possibly dotted) name at 0:5.
    pub fn unit(name: &str) -> Self {
        Self {
            kind: UnitKind::Unit,
            name: QualifiedIdent::dotted(name, 0, 5),
            interface: Section::default(),
            implementation: Section::default(),
            initialization: None,
            finalization: None,
        }
    }

    /// An empty program with the given name at 0:8.
    pub fn program(name: &str) -> Self {
        Self {
            kind: UnitKind::Program,
            ..Self::unit(name)
        }
    }
}

/// The `interface` or `implementation` part of a unit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Section {
    pub uses: Vec<QualifiedIdent>,
    pub decls: Vec<DeclItem>,
}

/// A declaration section entry.
#[derive(Clone, Debug, PartialEq)]
pub enum DeclItem {
    Types(Vec<TypeDecl>),
    Vars(Vec<VarDecl>),
    Consts(Vec<ConstDecl>),
    Routine(RoutineDecl),
}

/// `Name<T> = TypeExpr;`
#[derive(Clone, Debug, PartialEq)]
pub struct TypeDecl {
    pub name: Ident,
    pub type_params: Vec<Ident>,
    pub ty: TypeExpr,
}

/// `A, B: TypeExpr = Value;` (also used for fields).
#[derive(Clone, Debug, PartialEq)]
pub struct VarDecl {
    pub names: Vec<Ident>,
    pub ty: TypeExpr,
    pub value: Option<Expr>,
}

/// `Name: TypeExpr = Value;`
#[derive(Clone, Debug, PartialEq)]
pub struct ConstDecl {
    pub name: Ident,
    pub ty: Option<TypeExpr>,
    pub value: Expr,
}

/// A reference to a named type, possibly with generic arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeRef {
    pub path: QualifiedIdent,
    pub args: Vec<TypeExpr>,
}

impl TypeRef {
    /// A simple, non-generic type reference.
    pub fn named(text: &str, line: u32, col: u32) -> Self {
        Self {
            path: QualifiedIdent::simple(Ident::new(text, line, col)),
            args: Vec::new(),
        }
    }
}

/// A type as written in a declaration.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeExpr {
    Named(TypeRef),
    Subrange { low: Expr, high: Expr },
    Enum { elements: Vec<Ident>, scoped: bool },
    Set(Box<TypeExpr>),
    /// `array[dims] of element`; no dims means a dynamic array.
    Array { dims: Vec<TypeExpr>, element: Box<TypeExpr> },
    /// `^Target`; `pointer_math` reflects `{$POINTERMATH ON}` at the declaration.
    Pointer { target: Box<TypeExpr>, pointer_math: bool },
    Procedural {
        params: Vec<ParamGroup>,
        ret: Option<Box<TypeExpr>>,
        of_object: bool,
    },
    ClassOf(TypeRef),
    Struct(StructDecl),
}

impl TypeExpr {
    /// Shorthand for [`TypeRef::named`].
    pub fn named(text: &str, line: u32, col: u32) -> Self {
        TypeExpr::Named(TypeRef::named(text, line, col))
    }
}

/// The flavor of a structured type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StructKind {
    Record,
    Object,
    Class,
    Interface,
}

/// Member visibility, ordered from least to most accessible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Visibility {
    StrictPrivate,
    Private,
    StrictProtected,
    Protected,
    Public,
    Published,
}

impl Visibility {
    /// Accessible from outside the declaring type and its descendants.
    pub fn is_public(self) -> bool {
        self >= Visibility::Public
    }
}

/// `record ... end`, `class(TBase) ... end`, `interface ... end`.
#[derive(Clone, Debug, PartialEq)]
pub struct StructDecl {
    pub kind: StructKind,
    /// `TFoo = class;`
    pub forward: bool,
    pub ancestors: Vec<TypeRef>,
    pub members: Vec<Member>,
}

/// One member of a structured type with its effective visibility.
#[derive(Clone, Debug, PartialEq)]
pub struct Member {
    pub visibility: Visibility,
    pub kind: MemberKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MemberKind {
    Fields(VarDecl),
    Method(RoutineHeading),
    Property(PropertyDecl),
    Types(Vec<TypeDecl>),
    Consts(Vec<ConstDecl>),
}

/// `property Name[Index: Integer]: Type read Getter write Setter; default;`
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyDecl {
    pub name: Ident,
    pub params: Vec<ParamGroup>,
    /// `None` for a redeclaration that only changes visibility.
    pub ty: Option<TypeExpr>,
    pub read: Option<QualifiedIdent>,
    pub write: Option<QualifiedIdent>,
    pub is_default: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoutineKind {
    Procedure,
    Function,
    Constructor,
    Destructor,
    Operator,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ParamModifier {
    #[default]
    Value,
    Const,
    Var,
    Out,
}

/// `const A, B: Integer = 0`
#[derive(Clone, Debug, PartialEq)]
pub struct ParamGroup {
    pub modifier: ParamModifier,
    pub names: Vec<Ident>,
    /// `None` for untyped `var`/`const` parameters.
    pub ty: Option<TypeExpr>,
    pub default: Option<Expr>,
}

impl ParamGroup {
    pub fn new(names: Vec<Ident>, ty: TypeExpr) -> Self {
        Self {
            modifier: ParamModifier::Value,
            names,
            ty: Some(ty),
            default: None,
        }
    }
}

/// A routine signature, in a type body or a declaration section.
#[derive(Clone, Debug, PartialEq)]
pub struct RoutineHeading {
    pub kind: RoutineKind,
    /// `Foo`, or `TFoo.Foo` for method implementations.
    pub name: QualifiedIdent,
    pub params: Vec<ParamGroup>,
    pub ret: Option<TypeExpr>,
    pub is_class: bool,
    pub is_overload: bool,
}

impl RoutineHeading {
    pub fn new(kind: RoutineKind, name: QualifiedIdent) -> Self {
        Self {
            kind,
            name,
            params: Vec::new(),
            ret: None,
            is_class: false,
            is_overload: false,
        }
    }
}

/// A routine with an optional body (`None` for forward and external routines).
#[derive(Clone, Debug, PartialEq)]
pub struct RoutineDecl {
    pub heading: RoutineHeading,
    pub body: Option<RoutineBody>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoutineBody {
    pub decls: Vec<DeclItem>,
    pub block: Block,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_ident_parts() {
        let q = QualifiedIdent::new(vec![Ident::new("TFoo", 3, 10), Ident::new("Bar", 3, 15)]).unwrap();
        assert_eq!(q.name(), Name::new("tfoo.bar"));
        assert_eq!(q.last().name, Name::new("Bar"));
        assert_eq!(q.qualifier().len(), 1);
        assert_eq!(q.pos(), LineCol::new(3, 10));
        assert!(q.is_qualified());
    }

    #[test]
    fn test_qualified_ident_is_never_empty() {
        assert_eq!(QualifiedIdent::new(Vec::new()), None);

        let single = QualifiedIdent::new(vec![Ident::new("Bar", 2, 4)]).unwrap();
        assert_eq!(single, QualifiedIdent::simple(Ident::new("Bar", 2, 4)));
        assert!(single.qualifier().is_empty());
        assert_eq!(single.qualifier_path(), None);
        assert_eq!(single.pos(), LineCol::new(2, 4));

        let nested = QualifiedIdent::dotted("TOuter.TFoo.Bar", 5, 10);
        assert_eq!(nested.last().name, Name::new("Bar"));
        assert_eq!(nested.qualifier_path().unwrap().name(), Name::new("touter.tfoo"));
        assert_eq!(QualifiedIdent::dotted("", 0, 0).last().name, Name::new(""));
    }

    #[test]
    fn test_unit_constructor_splits_dotted_names() {
        let unit = SourceUnit::unit("System.SysUtils");
        assert_eq!(unit.name.parts().count(), 2);
        assert_eq!(unit.name.name(), Name::new("System.SysUtils"));
        assert_eq!(SourceUnit::program("Demo").kind, UnitKind::Program);
    }

    #[test]
    fn test_visibility_order() {
        assert!(Visibility::Published.is_public());
        assert!(Visibility::Public.is_public());
        assert!(!Visibility::Protected.is_public());
        assert!(!Visibility::StrictPrivate.is_public());
    }
}
