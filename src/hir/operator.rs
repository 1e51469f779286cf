//! Operator invocables.
//!
//! An operator expression is resolved like a call: the operand types each
//! contribute a set of candidate signatures ([`Invocable`]s) and overload
//! resolution picks one. Candidates come from two places:
//!
//! - `class operator` methods declared directly in a struct operand's type
//!   (inherited operators are not considered)
//! - compiler intrinsics, enumerated per operator by
//!   [`OperatorInvocableCollector::collect`]
//!
//! Intrinsic names follow the operator method names (`Add`, `IntDivide`,
//! `BitwiseAnd`, `LogicalNot` ...), with variant operations prefixed
//! `Variant::`.

use indexmap::IndexSet;
use smol_str::{SmolStr, format_smolstr};

use super::decl::{Declaration, MethodKind};
use super::ids::{DeclId, TypeId};
use super::table::SymbolTable;
use super::ty::{ArgumentMatcher, IntrinsicType};
pub use crate::ast::{BinaryOperator, UnaryOperator};

// ============================================================================
// OPERATORS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Binary(BinaryOperator),
    Unary(UnaryOperator),
}

impl Operator {
    /// Names of the `class operator` methods that overload this operator.
    pub fn method_names(self) -> &'static [&'static str] {
        match self {
            Operator::Binary(op) => match op {
                BinaryOperator::And => &["LogicalAnd", "BitwiseAnd"],
                BinaryOperator::Or => &["LogicalOr", "BitwiseOr"],
                BinaryOperator::Xor => &["LogicalXor", "BitwiseXor"],
                BinaryOperator::Equal => &["Equal"],
                BinaryOperator::NotEqual => &["NotEqual"],
                BinaryOperator::LessThan => &["LessThan"],
                BinaryOperator::LessThanEqual => &["LessThanOrEqual"],
                BinaryOperator::GreaterThan => &["GreaterThan"],
                BinaryOperator::GreaterThanEqual => &["GreaterThanOrEqual"],
                BinaryOperator::In => &["In"],
                BinaryOperator::Add => &["Add"],
                BinaryOperator::Subtract => &["Subtract"],
                BinaryOperator::Multiply => &["Multiply"],
                BinaryOperator::Divide => &["Divide"],
                BinaryOperator::Div => &["IntDivide"],
                BinaryOperator::Mod => &["Modulus"],
                BinaryOperator::Shl => &["LeftShift"],
                BinaryOperator::Shr => &["RightShift"],
                BinaryOperator::Is | BinaryOperator::As => &[],
            },
            Operator::Unary(op) => match op {
                UnaryOperator::Not => &["LogicalNot"],
                UnaryOperator::Plus => &["Positive"],
                UnaryOperator::Negate => &["Negative"],
                UnaryOperator::Address => &[],
            },
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Operator::Binary(_) => 2,
            Operator::Unary(_) => 1,
        }
    }

    /// Whether `method` is a `class operator` overloading this operator.
    pub fn is_overloaded_by(self, method: &Declaration) -> bool {
        let Some(data) = method.method() else {
            return false;
        };
        data.kind == MethodKind::Operator
            && data.params.len() == self.arity()
            && self.method_names().iter().any(|name| method.name.eq_ignore_case(name))
    }

    fn image(self) -> &'static str {
        match self {
            Operator::Binary(op) => match op {
                BinaryOperator::And => "And",
                BinaryOperator::Or => "Or",
                BinaryOperator::Xor => "Xor",
                BinaryOperator::Equal => "Equal",
                BinaryOperator::NotEqual => "NotEqual",
                BinaryOperator::LessThan => "LessThan",
                BinaryOperator::LessThanEqual => "LessThanEqual",
                BinaryOperator::GreaterThan => "GreaterThan",
                BinaryOperator::GreaterThanEqual => "GreaterThanEqual",
                BinaryOperator::In => "In",
                BinaryOperator::Is => "Is",
                BinaryOperator::As => "As",
                BinaryOperator::Add => "Add",
                BinaryOperator::Subtract => "Subtract",
                BinaryOperator::Multiply => "Multiply",
                BinaryOperator::Divide => "Divide",
                BinaryOperator::Div => "Div",
                BinaryOperator::Mod => "Mod",
                BinaryOperator::Shl => "Shl",
                BinaryOperator::Shr => "Shr",
            },
            Operator::Unary(op) => match op {
                UnaryOperator::Not => "Not",
                UnaryOperator::Plus => "Plus",
                UnaryOperator::Negate => "Negate",
                UnaryOperator::Address => "Address",
            },
        }
    }
}

impl From<BinaryOperator> for Operator {
    fn from(op: BinaryOperator) -> Self {
        Operator::Binary(op)
    }
}

impl From<UnaryOperator> for Operator {
    fn from(op: UnaryOperator) -> Self {
        Operator::Unary(op)
    }
}

// ============================================================================
// INVOCABLES
// ============================================================================

/// A compiler-provided operator signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OperatorIntrinsic {
    pub name: SmolStr,
    pub params: Vec<TypeId>,
    pub return_type: TypeId,
}

impl OperatorIntrinsic {
    fn new(name: impl Into<SmolStr>, params: Vec<TypeId>, return_type: TypeId) -> Self {
        Self {
            name: name.into(),
            params,
            return_type,
        }
    }
}

/// Anything overload resolution can pick: a declared routine or an intrinsic.
///
/// Equality is signature identity: the same method declaration, or the same
/// intrinsic name, parameter types and return type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Invocable {
    Method(DeclId),
    Intrinsic(OperatorIntrinsic),
}

impl Invocable {
    pub fn name<'t>(&'t self, table: &'t SymbolTable) -> &'t str {
        match self {
            Invocable::Method(id) => table.declaration(*id).name.as_str(),
            Invocable::Intrinsic(intrinsic) => &intrinsic.name,
        }
    }

    pub fn param_types(&self, table: &SymbolTable) -> Vec<TypeId> {
        match self {
            Invocable::Method(id) => table
                .declaration(*id)
                .method()
                .map(|m| m.params.iter().map(|p| p.ty).collect())
                .unwrap_or_default(),
            Invocable::Intrinsic(intrinsic) => intrinsic.params.clone(),
        }
    }

    /// Parameters without a default value.
    pub fn required_params(&self, table: &SymbolTable) -> usize {
        match self {
            Invocable::Method(id) => table.declaration(*id).method().map_or(0, |m| m.required_params()),
            Invocable::Intrinsic(intrinsic) => intrinsic.params.len(),
        }
    }

    pub fn return_type(&self, table: &SymbolTable) -> TypeId {
        match self {
            Invocable::Method(id) => table
                .declaration(*id)
                .method()
                .map_or_else(|| table.types().unknown(), |m| m.return_type),
            Invocable::Intrinsic(intrinsic) => intrinsic.return_type,
        }
    }

    pub fn method(&self) -> Option<DeclId> {
        match self {
            Invocable::Method(id) => Some(*id),
            Invocable::Intrinsic(_) => None,
        }
    }

    /// `Name(Type1,Type2)` for diagnostics.
    pub fn image(&self, table: &SymbolTable) -> String {
        let params: Vec<&str> = self.param_types(table).iter().map(|ty| table.types().image(*ty)).collect();
        format!("{}({})", self.name(table), params.join(","))
    }
}

// ============================================================================
// COLLECTOR
// ============================================================================

/// Enumerates the invocables an operand type contributes to an operator.
pub struct OperatorInvocableCollector<'a> {
    table: &'a SymbolTable,
}

impl<'a> OperatorInvocableCollector<'a> {
    pub fn new(table: &'a SymbolTable) -> Self {
        Self { table }
    }

    fn intrinsic(&self, ty: IntrinsicType) -> TypeId {
        self.table.types().intrinsic(ty)
    }

    /// Candidates contributed by an operand of type `ty`, in a stable order
    /// without duplicates.
    pub fn collect(&self, ty: TypeId, operator: Operator) -> IndexSet<Invocable> {
        match operator {
            Operator::Binary(op) => self.collect_binary(ty, op),
            Operator::Unary(op) => self.collect_unary(ty, op),
        }
    }

    fn collect_binary(&self, ty: TypeId, op: BinaryOperator) -> IndexSet<Invocable> {
        let types = self.table.types();
        let mut result = IndexSet::new();

        if types.is_struct(ty) {
            result.extend(self.operator_overloads(ty, Operator::Binary(op)));
        } else if types.is_pointer(ty) {
            result.extend(self.pointer_math(ty, op));
        } else if types.is_variant(ty) && !matches!(op, BinaryOperator::In | BinaryOperator::As) {
            result.insert(self.variant_binary(op));
        }

        match op {
            BinaryOperator::And => result.extend(self.logical_and_bitwise("And")),
            BinaryOperator::Or => result.extend(self.logical_and_bitwise("Or")),
            BinaryOperator::Xor => result.extend(self.logical_and_bitwise("Xor")),
            BinaryOperator::Equal
            | BinaryOperator::NotEqual
            | BinaryOperator::LessThan
            | BinaryOperator::LessThanEqual
            | BinaryOperator::GreaterThan
            | BinaryOperator::GreaterThanEqual => {
                result.insert(self.comparison(Operator::Binary(op).image()));
            }
            BinaryOperator::In => {
                result.insert(self.membership());
            }
            BinaryOperator::Add => {
                result.extend(self.arithmetic_and_set("Add"));
                let string = self.intrinsic(IntrinsicType::UnicodeString);
                result.insert(Invocable::Intrinsic(OperatorIntrinsic::new("Add", vec![string, string], string)));
            }
            BinaryOperator::Subtract => result.extend(self.arithmetic_and_set("Subtract")),
            BinaryOperator::Multiply => result.extend(self.arithmetic_and_set("Multiply")),
            BinaryOperator::Divide => {
                let extended = self.intrinsic(IntrinsicType::Extended);
                result.insert(Invocable::Intrinsic(OperatorIntrinsic::new(
                    "Divide",
                    vec![extended, extended],
                    extended,
                )));
            }
            BinaryOperator::Div => result.extend(self.integer_binary("IntDivide")),
            BinaryOperator::Mod => result.extend(self.integer_binary("Modulus")),
            BinaryOperator::Shl => result.extend(self.integer_binary("LeftShift")),
            BinaryOperator::Shr => result.extend(self.integer_binary("RightShift")),
            BinaryOperator::Is | BinaryOperator::As => {}
        }
        result
    }

    fn collect_unary(&self, ty: TypeId, op: UnaryOperator) -> IndexSet<Invocable> {
        let types = self.table.types();
        let mut result = IndexSet::new();

        if types.is_struct(ty) {
            result.extend(self.operator_overloads(ty, Operator::Unary(op)));
        } else if types.is_variant(ty) && op != UnaryOperator::Address {
            // One parameter, like every other unary intrinsic, so a single
            // argument can match it.
            let variant = self.intrinsic(IntrinsicType::Variant);
            let name = format_smolstr!("Variant::{}", Operator::Unary(op).image());
            result.insert(Invocable::Intrinsic(OperatorIntrinsic::new(name, vec![variant], variant)));
        }

        match op {
            UnaryOperator::Not => {
                result.extend(self.integer_unary("BitwiseNot"));
                let boolean = self.intrinsic(IntrinsicType::Boolean);
                result.insert(Invocable::Intrinsic(OperatorIntrinsic::new("LogicalNot", vec![boolean], boolean)));
            }
            UnaryOperator::Plus => result.extend(self.arithmetic_unary("Positive")),
            UnaryOperator::Negate => result.extend(self.arithmetic_unary("Negative")),
            UnaryOperator::Address => {}
        }
        result
    }

    /// `class operator` methods declared directly in the type.
    fn operator_overloads(&self, ty: TypeId, operator: Operator) -> Vec<Invocable> {
        let Some(scope) = self.table.types().type_scope(ty) else {
            return Vec::new();
        };
        self.table
            .scope(scope)
            .declarations()
            .filter(|&id| operator.is_overloaded_by(self.table.declaration(id)))
            .map(Invocable::Method)
            .collect()
    }

    fn pointer_math(&self, ty: TypeId, op: BinaryOperator) -> Vec<Invocable> {
        if !self.table.types().allows_pointer_math(ty) {
            return Vec::new();
        }
        let integer = self.intrinsic(IntrinsicType::Integer);
        let operand = self.table.types().matcher(ArgumentMatcher::PointerMathOperand);
        let sig = |params: Vec<TypeId>, ret: TypeId, name: &str| Invocable::Intrinsic(OperatorIntrinsic::new(name, params, ret));
        match op {
            BinaryOperator::Add => vec![
                sig(vec![ty, integer], ty, "Add"),
                sig(vec![integer, ty], ty, "Add"),
                sig(vec![ty, operand], ty, "Add"),
            ],
            BinaryOperator::Subtract => vec![
                sig(vec![ty, integer], ty, "Subtract"),
                sig(vec![ty, operand], integer, "Subtract"),
            ],
            _ => Vec::new(),
        }
    }

    fn variant_binary(&self, op: BinaryOperator) -> Invocable {
        let variant = self.intrinsic(IntrinsicType::Variant);
        let ret = if op.is_comparison() {
            self.intrinsic(IntrinsicType::Boolean)
        } else {
            variant
        };
        let name = format_smolstr!("Variant::{}", Operator::Binary(op).image());
        Invocable::Intrinsic(OperatorIntrinsic::new(name, vec![variant, variant], ret))
    }

    fn logical_and_bitwise(&self, suffix: &str) -> Vec<Invocable> {
        let boolean = self.intrinsic(IntrinsicType::Boolean);
        let mut result = self.integer_binary(&format!("Bitwise{}", suffix));
        result.push(Invocable::Intrinsic(OperatorIntrinsic::new(
            format_smolstr!("Logical{}", suffix),
            vec![boolean, boolean],
            boolean,
        )));
        result
    }

    fn comparison(&self, name: &str) -> Invocable {
        let untyped = self.table.types().untyped();
        Invocable::Intrinsic(OperatorIntrinsic::new(
            name,
            vec![untyped, untyped],
            self.intrinsic(IntrinsicType::Boolean),
        ))
    }

    fn membership(&self) -> Invocable {
        let types = self.table.types();
        Invocable::Intrinsic(OperatorIntrinsic::new(
            "In",
            vec![types.matcher(ArgumentMatcher::AnyOrdinal), types.matcher(ArgumentMatcher::AnySet)],
            self.intrinsic(IntrinsicType::Boolean),
        ))
    }

    fn integer_binary(&self, name: &str) -> Vec<Invocable> {
        let integer = self.intrinsic(IntrinsicType::Integer);
        let int64 = self.intrinsic(IntrinsicType::Int64);
        [
            (integer, integer, integer),
            (integer, int64, int64),
            (int64, integer, int64),
            (int64, int64, int64),
        ]
        .into_iter()
        .map(|(left, right, ret)| Invocable::Intrinsic(OperatorIntrinsic::new(name, vec![left, right], ret)))
        .collect()
    }

    fn arithmetic_and_set(&self, name: &str) -> Vec<Invocable> {
        let integer = self.intrinsic(IntrinsicType::Integer);
        let extended = self.intrinsic(IntrinsicType::Extended);
        let any_set = self.table.types().matcher(ArgumentMatcher::AnySet);
        let mut result = self.integer_binary(name);
        for (left, right) in [(extended, extended), (integer, extended), (extended, integer)] {
            result.push(Invocable::Intrinsic(OperatorIntrinsic::new(name, vec![left, right], extended)));
        }
        result.push(Invocable::Intrinsic(OperatorIntrinsic::new(
            name,
            vec![any_set, any_set],
            self.table.types().empty_set(),
        )));
        result
    }

    fn integer_unary(&self, name: &str) -> Vec<Invocable> {
        [IntrinsicType::Integer, IntrinsicType::Int64]
            .into_iter()
            .map(|ty| {
                let ty = self.intrinsic(ty);
                Invocable::Intrinsic(OperatorIntrinsic::new(name, vec![ty], ty))
            })
            .collect()
    }

    fn arithmetic_unary(&self, name: &str) -> Vec<Invocable> {
        let extended = self.intrinsic(IntrinsicType::Extended);
        let mut result = self.integer_unary(name);
        result.push(Invocable::Intrinsic(OperatorIntrinsic::new(name, vec![extended], extended)));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnalysisConfig;
    use crate::hir::SymbolTableBuilder;

    fn system() -> SymbolTable {
        SymbolTableBuilder::new(AnalysisConfig::default()).build().unwrap()
    }

    fn names(table: &SymbolTable, set: &IndexSet<Invocable>) -> Vec<String> {
        set.iter().map(|i| i.image(table)).collect()
    }

    #[test]
    fn test_integer_add_has_four_width_pairings() {
        let table = system();
        let integer = table.types().intrinsic(IntrinsicType::Integer);
        let set = OperatorInvocableCollector::new(&table).collect(integer, BinaryOperator::Add.into());
        let images = names(&table, &set);

        for expected in [
            "Add(Integer,Integer)",
            "Add(Integer,Int64)",
            "Add(Int64,Integer)",
            "Add(Int64,Int64)",
            "Add(Extended,Extended)",
            "Add(Integer,Extended)",
            "Add(Extended,Integer)",
            "Add(<set>,<set>)",
            "Add(UnicodeString,UnicodeString)",
        ] {
            assert!(images.iter().any(|i| i == expected), "missing {}", expected);
        }
        assert_eq!(set.len(), 9);
    }

    #[test]
    fn test_is_and_as_contribute_nothing_for_plain_operands() {
        let table = system();
        let integer = table.types().intrinsic(IntrinsicType::Integer);
        let collector = OperatorInvocableCollector::new(&table);
        assert!(collector.collect(integer, BinaryOperator::Is.into()).is_empty());
        assert!(collector.collect(integer, BinaryOperator::As.into()).is_empty());
        assert!(collector.collect(integer, UnaryOperator::Address.into()).is_empty());
    }

    #[test]
    fn test_union_of_operand_sets_has_no_duplicates() {
        let table = system();
        let integer = table.types().intrinsic(IntrinsicType::Integer);
        let collector = OperatorInvocableCollector::new(&table);
        let mut set = collector.collect(integer, BinaryOperator::Mod.into());
        set.extend(collector.collect(integer, BinaryOperator::Mod.into()));
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_operator_method_names() {
        assert_eq!(Operator::Binary(BinaryOperator::Div).method_names(), &["IntDivide"]);
        assert_eq!(Operator::Unary(UnaryOperator::Negate).method_names(), &["Negative"]);
        assert!(Operator::Binary(BinaryOperator::Is).method_names().is_empty());
    }
}
