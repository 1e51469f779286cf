//! Declarations.
//!
//! A [`Declaration`] is anything a name can resolve to: a unit, a type, a
//! variable, a routine, a property, an enum element. Declarations are stored
//! in the symbol table arena and never compared structurally; identity is the
//! [`DeclId`](super::DeclId), and [`DeclKey`] is the explicit key used when
//! two declarations must be recognised as the same entity (a forward heading
//! and its implementation).

use smol_str::{SmolStr, format_smolstr};

use super::ids::{DeclId, Location, ScopeId, TypeId, UnitId};
use super::ty::TypeTable;
use crate::ast::{ParamModifier, Visibility};
use crate::base::Name;

/// The unit section a declaration was made in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    Interface,
    Implementation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MethodKind {
    Normal,
    Constructor,
    Destructor,
    /// `class operator Add(...)`
    Operator,
    /// Compiler magic routines in System (`Length`, `High`, `Inc` ...).
    Intrinsic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Global,
    Local,
    Field,
    Parameter(ParamModifier),
    Constant,
    /// `Result` inside a function.
    Result,
    /// `Self` inside a method.
    SelfValue,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    pub name: Name,
    pub ty: TypeId,
    pub modifier: ParamModifier,
    pub has_default: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MethodDecl {
    pub kind: MethodKind,
    pub params: Vec<Parameter>,
    /// `Void` for procedures.
    pub return_type: TypeId,
    pub is_class_method: bool,
    pub is_overload: bool,
    /// Declaration in the type body when this is a method.
    pub owner: Option<TypeId>,
    /// Whether an implementation (body) has been seen.
    pub implemented: bool,
}

impl MethodDecl {
    /// Parameters that must be passed explicitly.
    pub fn required_params(&self) -> usize {
        self.params.iter().filter(|p| !p.has_default).count()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PropertyDecl {
    pub ty: TypeId,
    /// Index parameters of an array property.
    pub params: Vec<Parameter>,
    pub is_default: bool,
    pub read: Option<DeclId>,
    pub write: Option<DeclId>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DeclKind {
    /// The unit itself, declared in its own scope.
    Unit(UnitId),
    /// A `uses` entry; `None` when the unit was never supplied.
    UnitImport(Option<UnitId>),
    Type(TypeId),
    Variable { ty: TypeId, kind: VariableKind },
    Method(MethodDecl),
    Property(PropertyDecl),
    EnumElement(TypeId),
    TypeParameter(TypeId),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    pub name: Name,
    pub kind: DeclKind,
    /// The scope the declaration was inserted into.
    pub scope: ScopeId,
    pub location: Location,
    pub visibility: Visibility,
    pub section: Section,
}

impl Declaration {
    pub fn unit(&self) -> UnitId {
        self.location.unit
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, DeclKind::Method(_))
    }

    pub fn method(&self) -> Option<&MethodDecl> {
        match &self.kind {
            DeclKind::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn property(&self) -> Option<&PropertyDecl> {
        match &self.kind {
            DeclKind::Property(property) => Some(property),
            _ => None,
        }
    }

    pub fn is_operator(&self) -> bool {
        self.method().is_some_and(|m| m.kind == MethodKind::Operator)
    }

    pub fn is_unit_name(&self) -> bool {
        matches!(self.kind, DeclKind::Unit(_) | DeclKind::UnitImport(_))
    }

    /// The type this declaration denotes (for type names) or carries (for
    /// values): a variable's type, a function's result, a property's type.
    pub fn value_type(&self) -> Option<TypeId> {
        match &self.kind {
            DeclKind::Variable { ty, .. } | DeclKind::EnumElement(ty) => Some(*ty),
            DeclKind::Method(method) => Some(method.return_type),
            DeclKind::Property(property) => Some(property.ty),
            DeclKind::Type(_) | DeclKind::TypeParameter(_) | DeclKind::Unit(_) | DeclKind::UnitImport(_) => None,
        }
    }

    /// The type named by a type or type parameter declaration.
    pub fn declared_type(&self) -> Option<TypeId> {
        match &self.kind {
            DeclKind::Type(ty) | DeclKind::TypeParameter(ty) => Some(*ty),
            _ => None,
        }
    }

    /// Parameter list image used to tell overloads apart (`(Integer,String)`).
    pub fn signature(&self, types: &TypeTable) -> SmolStr {
        let params = match &self.kind {
            DeclKind::Method(method) => &method.params,
            DeclKind::Property(property) if !property.params.is_empty() => &property.params,
            _ => return SmolStr::default(),
        };
        let list: Vec<&str> = params.iter().map(|p| types.image(p.ty)).collect();
        format_smolstr!("({})", list.join(","))
    }

    pub fn key(&self, types: &TypeTable) -> DeclKey {
        DeclKey {
            name: SmolStr::new(self.name.folded()),
            signature: self.signature(types),
            location: self.location,
        }
    }
}

/// Explicit declaration identity: folded name, signature image and location.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DeclKey {
    pub name: SmolStr,
    pub signature: SmolStr,
    pub location: Location,
}

impl DeclKey {
    /// Same name and signature, wherever declared.
    pub fn same_entity(&self, other: &DeclKey) -> bool {
        self.name == other.name && self.signature == other.signature
    }
}
