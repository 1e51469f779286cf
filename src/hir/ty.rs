//! Type model.
//!
//! All types live in a [`TypeTable`] arena and are compared by [`TypeId`].
//! Intrinsic types, the marker types (`Untyped`, `Unknown`, `Void`, `Nil`,
//! the empty set) and the argument matchers used by intrinsic operator
//! signatures are created up front, so every table agrees on their ids.
//!
//! Two anonymous types written the same way in two places (`^Integer`,
//! `array of Byte`) are distinct types, as in the language itself;
//! [`TypeTable::structurally_equal`] exists for overload scoring, which ranks
//! such pairs just below an exact match. Specializations are the exception:
//! `TList<Integer>` is interned per generic and argument list.

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::{SmolStr, format_smolstr};

use super::ids::{ScopeId, TypeId};
use crate::ast::StructKind;
use crate::error::{Result, SemaError};

const POINTER_SIZE: u32 = 8;

// ============================================================================
// TYPE KINDS
// ============================================================================

/// Types the System unit provides without a declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntrinsicType {
    Byte,
    ShortInt,
    Word,
    SmallInt,
    Integer,
    Cardinal,
    Int64,
    UInt64,
    Single,
    Double,
    Extended,
    Currency,
    Boolean,
    AnsiChar,
    Char,
    AnsiString,
    UnicodeString,
    ShortString,
    WideString,
    Variant,
    Pointer,
    PAnsiChar,
    PChar,
}

impl IntrinsicType {
    pub const ALL: [IntrinsicType; 23] = [
        IntrinsicType::Byte,
        IntrinsicType::ShortInt,
        IntrinsicType::Word,
        IntrinsicType::SmallInt,
        IntrinsicType::Integer,
        IntrinsicType::Cardinal,
        IntrinsicType::Int64,
        IntrinsicType::UInt64,
        IntrinsicType::Single,
        IntrinsicType::Double,
        IntrinsicType::Extended,
        IntrinsicType::Currency,
        IntrinsicType::Boolean,
        IntrinsicType::AnsiChar,
        IntrinsicType::Char,
        IntrinsicType::AnsiString,
        IntrinsicType::UnicodeString,
        IntrinsicType::ShortString,
        IntrinsicType::WideString,
        IntrinsicType::Variant,
        IntrinsicType::Pointer,
        IntrinsicType::PAnsiChar,
        IntrinsicType::PChar,
    ];

    pub fn image(self) -> &'static str {
        match self {
            IntrinsicType::Byte => "Byte",
            IntrinsicType::ShortInt => "ShortInt",
            IntrinsicType::Word => "Word",
            IntrinsicType::SmallInt => "SmallInt",
            IntrinsicType::Integer => "Integer",
            IntrinsicType::Cardinal => "Cardinal",
            IntrinsicType::Int64 => "Int64",
            IntrinsicType::UInt64 => "UInt64",
            IntrinsicType::Single => "Single",
            IntrinsicType::Double => "Double",
            IntrinsicType::Extended => "Extended",
            IntrinsicType::Currency => "Currency",
            IntrinsicType::Boolean => "Boolean",
            IntrinsicType::AnsiChar => "AnsiChar",
            IntrinsicType::Char => "Char",
            IntrinsicType::AnsiString => "AnsiString",
            IntrinsicType::UnicodeString => "UnicodeString",
            IntrinsicType::ShortString => "ShortString",
            IntrinsicType::WideString => "WideString",
            IntrinsicType::Variant => "Variant",
            IntrinsicType::Pointer => "Pointer",
            IntrinsicType::PAnsiChar => "PAnsiChar",
            IntrinsicType::PChar => "PChar",
        }
    }

    /// Other names the System unit declares for the same type.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            IntrinsicType::Integer => &["LongInt"],
            IntrinsicType::Cardinal => &["LongWord"],
            IntrinsicType::Int64 => &["NativeInt"],
            IntrinsicType::UInt64 => &["NativeUInt"],
            IntrinsicType::Double => &["Real"],
            IntrinsicType::Char => &["WideChar"],
            IntrinsicType::UnicodeString => &["String"],
            _ => &[],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StringKind {
    Ansi,
    Unicode,
    Short,
    Wide,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArrayKind {
    Static { length: u64 },
    Dynamic,
    /// `array of T` in a parameter list.
    Open,
}

/// Pseudo-types that only appear in intrinsic operator signatures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArgumentMatcher {
    AnyOrdinal,
    AnySet,
    PointerMathOperand,
}

/// A structured type (record, object, class or interface).
#[derive(Clone, Debug, PartialEq)]
pub struct StructType {
    pub kind: StructKind,
    /// Owns the member declarations.
    pub scope: ScopeId,
    /// Class parent first (if any), then implemented interfaces.
    pub ancestors: Vec<TypeId>,
    pub type_params: Vec<TypeId>,
    /// Still a forward declaration (`TFoo = class;`).
    pub forward: bool,
    /// Sum of field sizes, for records and objects.
    pub record_size: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypeKind {
    /// Resolution failed; absorbs every further query.
    Unknown,
    /// Untyped `var`/`const` parameters and untyped operator operands.
    Untyped,
    /// Procedure results.
    Void,
    Nil,
    Integer { size: u32, signed: bool },
    Real { size: u32 },
    Boolean { size: u32 },
    Char { size: u32 },
    String(StringKind),
    Variant,
    Enumeration { scope: ScopeId, count: u32 },
    Subrange { host: TypeId, low: Option<i64>, high: Option<i64> },
    /// `None` element marks the empty set.
    Set { element: Option<TypeId> },
    Array { element: TypeId, kind: ArrayKind },
    Pointer { target: Option<TypeId>, pointer_math: bool },
    Procedural { params: Vec<TypeId>, ret: TypeId, of_object: bool },
    ClassReference { class: TypeId },
    Struct(StructType),
    GenericParameter,
    Specialization { generic: TypeId, args: Vec<TypeId> },
    Matcher(ArgumentMatcher),
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeData {
    /// Printable, fully qualified for declared types (`Unit.TFoo`).
    pub image: SmolStr,
    pub kind: TypeKind,
}

// ============================================================================
// TYPE TABLE
// ============================================================================

/// Arena of every type known to a symbol table.
#[derive(Clone, Debug)]
pub struct TypeTable {
    types: Vec<TypeData>,
    intrinsics: Vec<TypeId>,
    unknown: TypeId,
    untyped: TypeId,
    void: TypeId,
    nil: TypeId,
    empty_set: TypeId,
    any_ordinal: TypeId,
    any_set: TypeId,
    pointer_math_operand: TypeId,
    specializations: FxHashMap<(TypeId, Vec<TypeId>), TypeId>,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeTable {
    /// Create a table holding the intrinsic and marker types.
    pub fn new() -> Self {
        let mut table = Self {
            types: Vec::new(),
            intrinsics: Vec::with_capacity(IntrinsicType::ALL.len()),
            unknown: TypeId::new(0),
            untyped: TypeId::new(0),
            void: TypeId::new(0),
            nil: TypeId::new(0),
            empty_set: TypeId::new(0),
            any_ordinal: TypeId::new(0),
            any_set: TypeId::new(0),
            pointer_math_operand: TypeId::new(0),
            specializations: FxHashMap::default(),
        };
        table.unknown = table.alloc("<unknown>", TypeKind::Unknown);
        table.untyped = table.alloc("<untyped>", TypeKind::Untyped);
        table.void = table.alloc("<void>", TypeKind::Void);
        table.nil = table.alloc("nil", TypeKind::Nil);
        table.empty_set = table.alloc("[]", TypeKind::Set { element: None });
        table.any_ordinal = table.alloc("<ordinal>", TypeKind::Matcher(ArgumentMatcher::AnyOrdinal));
        table.any_set = table.alloc("<set>", TypeKind::Matcher(ArgumentMatcher::AnySet));
        table.pointer_math_operand = table.alloc(
            "<pointer math operand>",
            TypeKind::Matcher(ArgumentMatcher::PointerMathOperand),
        );

        for intrinsic in IntrinsicType::ALL {
            let kind = table.intrinsic_kind(intrinsic);
            let id = table.alloc(intrinsic.image(), kind);
            table.intrinsics.push(id);
        }
        table
    }

    fn intrinsic_kind(&self, intrinsic: IntrinsicType) -> TypeKind {
        use IntrinsicType as I;
        match intrinsic {
            I::Byte => TypeKind::Integer { size: 1, signed: false },
            I::ShortInt => TypeKind::Integer { size: 1, signed: true },
            I::Word => TypeKind::Integer { size: 2, signed: false },
            I::SmallInt => TypeKind::Integer { size: 2, signed: true },
            I::Integer => TypeKind::Integer { size: 4, signed: true },
            I::Cardinal => TypeKind::Integer { size: 4, signed: false },
            I::Int64 => TypeKind::Integer { size: 8, signed: true },
            I::UInt64 => TypeKind::Integer { size: 8, signed: false },
            I::Single => TypeKind::Real { size: 4 },
            I::Double | I::Currency => TypeKind::Real { size: 8 },
            I::Extended => TypeKind::Real { size: 10 },
            I::Boolean => TypeKind::Boolean { size: 1 },
            I::AnsiChar => TypeKind::Char { size: 1 },
            I::Char => TypeKind::Char { size: 2 },
            I::AnsiString => TypeKind::String(StringKind::Ansi),
            I::UnicodeString => TypeKind::String(StringKind::Unicode),
            I::ShortString => TypeKind::String(StringKind::Short),
            I::WideString => TypeKind::String(StringKind::Wide),
            I::Variant => TypeKind::Variant,
            I::Pointer => TypeKind::Pointer {
                target: None,
                pointer_math: false,
            },
            // Char types precede the pointer types in `ALL`.
            I::PAnsiChar => TypeKind::Pointer {
                target: Some(self.intrinsic(I::AnsiChar)),
                pointer_math: true,
            },
            I::PChar => TypeKind::Pointer {
                target: Some(self.intrinsic(I::Char)),
                pointer_math: true,
            },
        }
    }

    fn alloc(&mut self, image: impl Into<SmolStr>, kind: TypeKind) -> TypeId {
        let id = TypeId::from_len(self.types.len());
        self.types.push(TypeData {
            image: image.into(),
            kind,
        });
        id
    }

    // ------------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------------

    pub fn get(&self, id: TypeId) -> &TypeData {
        &self.types[id.index()]
    }

    pub fn kind(&self, id: TypeId) -> &TypeKind {
        &self.types[id.index()].kind
    }

    pub fn image(&self, id: TypeId) -> &str {
        &self.types[id.index()].image
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn intrinsic(&self, intrinsic: IntrinsicType) -> TypeId {
        self.intrinsics[intrinsic as usize]
    }

    pub fn unknown(&self) -> TypeId {
        self.unknown
    }

    pub fn untyped(&self) -> TypeId {
        self.untyped
    }

    pub fn void(&self) -> TypeId {
        self.void
    }

    pub fn nil(&self) -> TypeId {
        self.nil
    }

    pub fn empty_set(&self) -> TypeId {
        self.empty_set
    }

    pub fn matcher(&self, matcher: ArgumentMatcher) -> TypeId {
        match matcher {
            ArgumentMatcher::AnyOrdinal => self.any_ordinal,
            ArgumentMatcher::AnySet => self.any_set,
            ArgumentMatcher::PointerMathOperand => self.pointer_math_operand,
        }
    }

    // ------------------------------------------------------------------------
    // Constructors
    // ------------------------------------------------------------------------

    pub fn enumeration(&mut self, image: impl Into<SmolStr>, scope: ScopeId, count: u32) -> TypeId {
        self.alloc(image, TypeKind::Enumeration { scope, count })
    }

    pub fn subrange(&mut self, host: TypeId, low: Option<i64>, high: Option<i64>) -> TypeId {
        let image = match (low, high) {
            (Some(low), Some(high)) => format_smolstr!("{}..{}", low, high),
            _ => format_smolstr!("{} subrange", self.image(host)),
        };
        let host = self.host(host);
        self.alloc(image, TypeKind::Subrange { host, low, high })
    }

    pub fn set_of(&mut self, element: TypeId) -> TypeId {
        let image = format_smolstr!("set of {}", self.image(element));
        self.alloc(image, TypeKind::Set { element: Some(element) })
    }

    pub fn array_of(&mut self, element: TypeId, kind: ArrayKind) -> TypeId {
        let image = match kind {
            ArrayKind::Static { length } => format_smolstr!("array[{}] of {}", length, self.image(element)),
            ArrayKind::Dynamic | ArrayKind::Open => format_smolstr!("array of {}", self.image(element)),
        };
        self.alloc(image, TypeKind::Array { element, kind })
    }

    /// `target` of `None` is the untyped `Pointer`.
    pub fn pointer_to(&mut self, target: Option<TypeId>, pointer_math: bool) -> TypeId {
        let image = match target {
            Some(target) => format_smolstr!("^{}", self.image(target)),
            None => SmolStr::new_static("Pointer"),
        };
        self.alloc(image, TypeKind::Pointer { target, pointer_math })
    }

    pub fn procedural(&mut self, params: Vec<TypeId>, ret: TypeId, of_object: bool) -> TypeId {
        let list: Vec<&str> = params.iter().map(|p| self.image(*p)).collect();
        let mut image = if self.is_void(ret) {
            format_smolstr!("procedure({})", list.join(", "))
        } else {
            format_smolstr!("function({}): {}", list.join(", "), self.image(ret))
        };
        if of_object {
            image = format_smolstr!("{} of object", image);
        }
        self.alloc(image, TypeKind::Procedural { params, ret, of_object })
    }

    pub fn class_reference(&mut self, class: TypeId) -> TypeId {
        let image = format_smolstr!("class of {}", self.image(class));
        self.alloc(image, TypeKind::ClassReference { class })
    }

    /// A structured type without ancestors; see [`TypeTable::complete_struct`].
    pub fn add_struct(&mut self, image: impl Into<SmolStr>, kind: StructKind, scope: ScopeId, forward: bool) -> TypeId {
        self.alloc(
            image,
            TypeKind::Struct(StructType {
                kind,
                scope,
                ancestors: Vec::new(),
                type_params: Vec::new(),
                forward,
                record_size: 0,
            }),
        )
    }

    pub fn generic_parameter(&mut self, image: impl Into<SmolStr>) -> TypeId {
        self.alloc(image, TypeKind::GenericParameter)
    }

    /// The specialization of `generic` for `args`, created on first use.
    pub fn specialize(&mut self, generic: TypeId, args: Vec<TypeId>) -> TypeId {
        let key = (generic, args);
        if let Some(&id) = self.specializations.get(&key) {
            return id;
        }
        let base = self.image(generic).split('<').next().unwrap_or_default();
        let list: Vec<&str> = key.1.iter().map(|a| self.image(*a)).collect();
        let image = format_smolstr!("{}<{}>", base, list.join(","));
        let id = self.alloc(
            image,
            TypeKind::Specialization {
                generic,
                args: key.1.clone(),
            },
        );
        self.specializations.insert(key, id);
        id
    }

    /// Attach ancestors to a struct and clear its forward flag.
    ///
    /// Fails if an ancestor already descends from `ty`.
    pub fn complete_struct(&mut self, ty: TypeId, ancestors: Vec<TypeId>) -> Result<()> {
        for &ancestor in &ancestors {
            if self.is_subtype_of(ancestor, ty) {
                return Err(SemaError::CyclicAncestry {
                    ty: self.get(ty).image.clone(),
                    ancestor: self.get(ancestor).image.clone(),
                });
            }
        }
        if let TypeKind::Struct(data) = &mut self.types[ty.index()].kind {
            data.ancestors = ancestors;
            data.forward = false;
        }
        Ok(())
    }

    pub(crate) fn set_type_params(&mut self, ty: TypeId, params: Vec<TypeId>) {
        if let TypeKind::Struct(data) = &mut self.types[ty.index()].kind {
            data.type_params = params;
        }
    }

    pub(crate) fn set_record_size(&mut self, ty: TypeId, size: u32) {
        if let TypeKind::Struct(data) = &mut self.types[ty.index()].kind {
            data.record_size = size;
        }
    }

    /// Give an anonymous type the name it was declared under.
    pub(crate) fn rename(&mut self, ty: TypeId, image: impl Into<SmolStr>) {
        self.types[ty.index()].image = image.into();
    }

    // ------------------------------------------------------------------------
    // Kind predicates
    // ------------------------------------------------------------------------

    pub fn is_unknown(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::Unknown)
    }

    pub fn is_untyped(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::Untyped)
    }

    pub fn is_void(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::Void)
    }

    pub fn is_nil(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::Nil)
    }

    pub fn is_variant(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::Variant)
    }

    pub fn is_integer(&self, ty: TypeId) -> bool {
        matches!(self.kind(self.host(ty)), TypeKind::Integer { .. })
    }

    pub fn is_real(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::Real { .. })
    }

    pub fn is_boolean(&self, ty: TypeId) -> bool {
        matches!(self.kind(self.host(ty)), TypeKind::Boolean { .. })
    }

    pub fn is_char(&self, ty: TypeId) -> bool {
        matches!(self.kind(self.host(ty)), TypeKind::Char { .. })
    }

    pub fn is_string(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::String(_))
    }

    pub fn is_enumeration(&self, ty: TypeId) -> bool {
        matches!(self.kind(self.host(ty)), TypeKind::Enumeration { .. })
    }

    /// Integers, booleans, chars, enumerations and their subranges.
    pub fn is_ordinal(&self, ty: TypeId) -> bool {
        matches!(
            self.kind(self.host(ty)),
            TypeKind::Integer { .. } | TypeKind::Boolean { .. } | TypeKind::Char { .. } | TypeKind::Enumeration { .. }
        )
    }

    pub fn is_set(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::Set { .. })
    }

    pub fn is_array(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::Array { .. })
    }

    pub fn is_pointer(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::Pointer { .. })
    }

    /// Pointers declared under `{$POINTERMATH ON}`, plus `PChar`/`PAnsiChar`.
    pub fn allows_pointer_math(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::Pointer { pointer_math: true, .. })
    }

    pub fn is_procedural(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::Procedural { .. })
    }

    pub fn is_class_reference(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::ClassReference { .. })
    }

    /// Records, objects, classes, interfaces and their specializations.
    pub fn is_struct(&self, ty: TypeId) -> bool {
        self.struct_type(ty).is_some()
    }

    pub fn is_class(&self, ty: TypeId) -> bool {
        self.struct_kind(ty) == Some(StructKind::Class)
    }

    pub fn is_interface(&self, ty: TypeId) -> bool {
        self.struct_kind(ty) == Some(StructKind::Interface)
    }

    pub fn is_record(&self, ty: TypeId) -> bool {
        self.struct_kind(ty) == Some(StructKind::Record)
    }

    pub fn is_generic_parameter(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::GenericParameter)
    }

    pub fn is_matcher(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::Matcher(_))
    }

    // ------------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------------

    /// The host type of a subrange, or `ty` itself.
    pub fn host(&self, ty: TypeId) -> TypeId {
        match self.kind(ty) {
            TypeKind::Subrange { host, .. } => *host,
            _ => ty,
        }
    }

    /// The struct data behind a struct or a specialization of one.
    pub fn struct_type(&self, ty: TypeId) -> Option<&StructType> {
        match self.kind(ty) {
            TypeKind::Struct(data) => Some(data),
            TypeKind::Specialization { generic, .. } => self.struct_type(*generic),
            _ => None,
        }
    }

    pub fn struct_kind(&self, ty: TypeId) -> Option<StructKind> {
        self.struct_type(ty).map(|data| data.kind)
    }

    pub fn ancestors(&self, ty: TypeId) -> &[TypeId] {
        self.struct_type(ty).map(|data| data.ancestors.as_slice()).unwrap_or(&[])
    }

    /// The scope holding the members of `ty`, looking through specializations
    /// and class references.
    pub fn type_scope(&self, ty: TypeId) -> Option<ScopeId> {
        match self.kind(ty) {
            TypeKind::Enumeration { scope, .. } => Some(*scope),
            TypeKind::ClassReference { class } => self.type_scope(*class),
            _ => self.struct_type(ty).map(|data| data.scope),
        }
    }

    /// Element type of an array or set.
    pub fn element_type(&self, ty: TypeId) -> Option<TypeId> {
        match self.kind(ty) {
            TypeKind::Array { element, .. } => Some(*element),
            TypeKind::Set { element } => *element,
            _ => None,
        }
    }

    /// Replace a generic parameter of the specialized generic by its argument.
    ///
    /// Only top-level parameter types are substituted (`T`, not `array of T`).
    pub fn substitute(&self, ty: TypeId, specialization: TypeId) -> TypeId {
        let TypeKind::Specialization { generic, args } = self.kind(specialization) else {
            return ty;
        };
        let Some(data) = self.struct_type(*generic) else {
            return ty;
        };
        data.type_params
            .iter()
            .position(|param| *param == ty)
            .and_then(|index| args.get(index).copied())
            .unwrap_or(ty)
    }

    /// Number of values of an ordinal type, where known.
    pub fn ordinal_count(&self, ty: TypeId) -> Option<u64> {
        match self.kind(ty) {
            TypeKind::Subrange {
                low: Some(low),
                high: Some(high),
                ..
            } => u64::try_from(high.saturating_sub(*low)).ok().map(|n| n + 1),
            TypeKind::Subrange { host, .. } => self.ordinal_count(*host),
            TypeKind::Enumeration { count, .. } => Some(u64::from(*count)),
            TypeKind::Boolean { .. } => Some(2),
            TypeKind::Integer { size, .. } | TypeKind::Char { size } if *size < 8 => Some(1 << (8 * size)),
            _ => None,
        }
    }

    /// Storage size in bytes. Records report the sum of their fields.
    pub fn size(&self, ty: TypeId) -> u32 {
        match self.kind(ty) {
            TypeKind::Integer { size, .. }
            | TypeKind::Real { size }
            | TypeKind::Boolean { size }
            | TypeKind::Char { size } => *size,
            TypeKind::String(StringKind::Short) => 256,
            TypeKind::String(_) => POINTER_SIZE,
            TypeKind::Variant => 16,
            TypeKind::Enumeration { count, .. } => match *count {
                0..=256 => 1,
                257..=65536 => 2,
                _ => 4,
            },
            TypeKind::Subrange { host, .. } => self.size(*host),
            TypeKind::Set { element: None } => 0,
            TypeKind::Set { element: Some(element) } => match self.ordinal_count(*element) {
                Some(count) => u32::try_from(count.div_ceil(8)).unwrap_or(32).clamp(1, 32),
                None => 32,
            },
            TypeKind::Array {
                element,
                kind: ArrayKind::Static { length },
            } => u32::try_from(length.saturating_mul(u64::from(self.size(*element)))).unwrap_or(u32::MAX),
            TypeKind::Array { .. } | TypeKind::Pointer { .. } | TypeKind::ClassReference { .. } => POINTER_SIZE,
            TypeKind::Procedural { of_object, .. } => {
                if *of_object {
                    2 * POINTER_SIZE
                } else {
                    POINTER_SIZE
                }
            }
            TypeKind::Struct(data) => match data.kind {
                StructKind::Class | StructKind::Interface => POINTER_SIZE,
                StructKind::Record | StructKind::Object => data.record_size,
            },
            TypeKind::Specialization { generic, .. } => self.size(*generic),
            TypeKind::Unknown
            | TypeKind::Untyped
            | TypeKind::Void
            | TypeKind::GenericParameter
            | TypeKind::Matcher(_) => 0,
            TypeKind::Nil => POINTER_SIZE,
        }
    }

    /// Type of a range expression: the larger operand, the left one on ties.
    pub fn wider(&self, low: TypeId, high: TypeId) -> TypeId {
        if self.size(high) > self.size(low) { high } else { low }
    }

    // ------------------------------------------------------------------------
    // Subtyping
    // ------------------------------------------------------------------------

    /// Whether `ty` is `target` or descends from it.
    ///
    /// Follows class parents, interface lists and specialization ancestry.
    /// `class of A` is a subtype of `class of B` when `A` is a subtype of `B`.
    pub fn is_subtype_of(&self, ty: TypeId, target: TypeId) -> bool {
        self.inheritance_distance(ty, target).is_some()
    }

    /// Number of ancestry steps from `ty` up to `target`, if it descends from it.
    pub fn inheritance_distance(&self, ty: TypeId, target: TypeId) -> Option<u32> {
        if ty == target {
            return Some(0);
        }
        if let (TypeKind::ClassReference { class: a }, TypeKind::ClassReference { class: b }) =
            (self.kind(ty), self.kind(target))
        {
            return self.inheritance_distance(*a, *b);
        }

        let mut visited = FxHashSet::default();
        let mut frontier = vec![ty];
        let mut depth = 0;
        while !frontier.is_empty() {
            depth += 1;
            let mut next = Vec::new();
            for current in frontier {
                for &ancestor in self.ancestors(current) {
                    if ancestor == target {
                        return Some(depth);
                    }
                    if visited.insert(ancestor) {
                        next.push(ancestor);
                    }
                }
            }
            frontier = next;
        }
        None
    }

    /// Whether `ty` or one of its ancestors has the given qualified image,
    /// compared case-insensitively (`"System.IEnumerable"`).
    pub fn is_subtype_of_name(&self, ty: TypeId, image: &str) -> bool {
        let mut visited = FxHashSet::default();
        let mut stack = vec![ty];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if self.image(current).eq_ignore_ascii_case(image) {
                return true;
            }
            stack.extend_from_slice(self.ancestors(current));
        }
        false
    }

    /// Same kind and components, ignoring identity and names.
    pub fn structurally_equal(&self, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }
        match (self.kind(a), self.kind(b)) {
            (TypeKind::Set { element: Some(x) }, TypeKind::Set { element: Some(y) }) => self.structurally_equal(*x, *y),
            (TypeKind::Array { element: x, kind: kx }, TypeKind::Array { element: y, kind: ky }) => {
                kx == ky && self.structurally_equal(*x, *y)
            }
            (TypeKind::Pointer { target: Some(x), .. }, TypeKind::Pointer { target: Some(y), .. }) => {
                self.structurally_equal(*x, *y)
            }
            (TypeKind::ClassReference { class: x }, TypeKind::ClassReference { class: y }) => x == y,
            (
                TypeKind::Procedural {
                    params: px,
                    ret: rx,
                    of_object: ox,
                },
                TypeKind::Procedural {
                    params: py,
                    ret: ry,
                    of_object: oy,
                },
            ) => {
                ox == oy
                    && px.len() == py.len()
                    && self.structurally_equal(*rx, *ry)
                    && px.iter().zip(py).all(|(x, y)| self.structurally_equal(*x, *y))
            }
            (TypeKind::Subrange { host: x, .. }, TypeKind::Subrange { host: y, .. }) => x == y,
            (kx, ky) if !matches!(kx, TypeKind::Struct(_) | TypeKind::Enumeration { .. }) => {
                kx == ky && self.image(a) == self.image(b)
            }
            _ => false,
        }
    }
}
