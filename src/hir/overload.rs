//! Overload resolution.
//!
//! Every candidate is scored per argument by how well the argument type
//! converts to the parameter type (see [`OverloadResolver::conversion`]).
//! Candidates that cannot take the arguments are dropped; among the rest a
//! candidate survives when no other candidate dominates it, i.e. is at least
//! as good on every argument and strictly better on one. Survivors are ordered
//! by distance from the call site, then by their position in the candidate
//! list (declaration order). More than one survivor at the nearest distance is
//! reported as [`Resolution::Ambiguous`], but a choice is still made.

use super::decl::MethodKind;
use super::ids::TypeId;
use super::operator::Invocable;
use super::table::SymbolTable;
use super::ty::{ArgumentMatcher, TypeKind};

/// How well an argument type converts to a parameter type; 0 is "not at all".
pub type Conversion = u8;

pub const EXACT: Conversion = 100;
pub const INCOMPATIBLE: Conversion = 0;

/// An overload candidate and how far from the call site it was found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub invocable: Invocable,
    pub distance: u32,
}

impl Candidate {
    pub fn new(invocable: Invocable, distance: u32) -> Self {
        Self { invocable, distance }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Resolved(Invocable),
    /// Several candidates were equally good; `chosen` is the stable pick.
    Ambiguous { chosen: Invocable, tied: Vec<Invocable> },
    NoMatch,
}

impl Resolution {
    pub fn chosen(&self) -> Option<&Invocable> {
        match self {
            Resolution::Resolved(chosen) | Resolution::Ambiguous { chosen, .. } => Some(chosen),
            Resolution::NoMatch => None,
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Resolution::Ambiguous { .. })
    }
}

pub struct OverloadResolver<'a> {
    table: &'a SymbolTable,
}

impl<'a> OverloadResolver<'a> {
    pub fn new(table: &'a SymbolTable) -> Self {
        Self { table }
    }

    /// Pick the candidate that best accepts `args`.
    pub fn resolve(&self, candidates: &[Candidate], args: &[TypeId]) -> Resolution {
        let scored: Vec<(usize, Vec<Conversion>)> = candidates
            .iter()
            .enumerate()
            .filter_map(|(index, candidate)| self.score(&candidate.invocable, args).map(|scores| (index, scores)))
            .collect();

        let mut survivors: Vec<usize> = scored
            .iter()
            .filter(|(_, scores)| !scored.iter().any(|(_, other)| dominates(other, scores)))
            .map(|(index, _)| *index)
            .collect();
        survivors.sort_by_key(|&index| (candidates[index].distance, index));

        let Some(&first) = survivors.first() else {
            return Resolution::NoMatch;
        };
        let nearest = candidates[first].distance;
        let tied: Vec<Invocable> = survivors[1..]
            .iter()
            .filter(|&&index| candidates[index].distance == nearest)
            .map(|&index| candidates[index].invocable.clone())
            .collect();
        let chosen = candidates[first].invocable.clone();

        if tied.is_empty() {
            Resolution::Resolved(chosen)
        } else {
            tracing::debug!(chosen = %chosen.image(self.table), tied = tied.len(), "ambiguous overload");
            Resolution::Ambiguous { chosen, tied }
        }
    }

    /// Per-argument conversions, or `None` when the candidate cannot be called
    /// with `args`.
    pub fn score(&self, invocable: &Invocable, args: &[TypeId]) -> Option<Vec<Conversion>> {
        let params = invocable.param_types(self.table);
        if args.len() > params.len() || args.len() < invocable.required_params(self.table) {
            return None;
        }
        let scores: Vec<Conversion> = args
            .iter()
            .zip(&params)
            .map(|(&arg, &param)| self.conversion(arg, param))
            .collect();
        if scores.contains(&INCOMPATIBLE) {
            return None;
        }
        Some(scores)
    }

    /// Rank the conversion of a value of type `arg` to a parameter of type `param`.
    pub fn conversion(&self, arg: TypeId, param: TypeId) -> Conversion {
        let types = self.table.types();
        if arg == param {
            return EXACT;
        }
        if let TypeKind::Matcher(matcher) = types.kind(param) {
            return self.matcher(*matcher, arg);
        }
        if types.is_unknown(arg) || types.is_unknown(param) {
            return 10;
        }
        if types.is_untyped(param) || types.is_untyped(arg) {
            return 30;
        }
        if types.is_generic_parameter(param) {
            return 40;
        }
        if types.host(arg) == param || types.host(param) == types.host(arg) {
            return 98;
        }
        if types.structurally_equal(arg, param) {
            return 95;
        }
        if types.is_nil(arg) {
            return if self.accepts_nil(param) { 85 } else { INCOMPATIBLE };
        }
        if let Some(distance) = types.inheritance_distance(arg, param) {
            return 90u32.saturating_sub(distance * 5).max(60) as Conversion;
        }

        let by_kind = self.kind_conversion(arg, param);
        if by_kind != INCOMPATIBLE {
            return by_kind;
        }
        if types.is_variant(param) && !types.is_struct(arg) {
            return 25;
        }
        if types.is_variant(arg) && !types.is_struct(param) {
            return 20;
        }
        if self.has_implicit_operator(arg, param) {
            return 5;
        }
        INCOMPATIBLE
    }

    fn matcher(&self, matcher: ArgumentMatcher, arg: TypeId) -> Conversion {
        let types = self.table.types();
        let accepted = match matcher {
            ArgumentMatcher::AnyOrdinal => types.is_ordinal(arg),
            ArgumentMatcher::AnySet => types.is_set(arg),
            ArgumentMatcher::PointerMathOperand => types.is_pointer(arg) || types.is_nil(arg),
        };
        if accepted {
            80
        } else if types.is_unknown(arg) {
            10
        } else {
            INCOMPATIBLE
        }
    }

    fn accepts_nil(&self, param: TypeId) -> bool {
        let types = self.table.types();
        types.is_pointer(param)
            || types.is_class(param)
            || types.is_interface(param)
            || types.is_class_reference(param)
            || types.is_procedural(param)
            || types.is_variant(param)
            || matches!(types.kind(param), TypeKind::Array { .. })
    }

    /// Conversions between built-in type families.
    fn kind_conversion(&self, arg: TypeId, param: TypeId) -> Conversion {
        let types = self.table.types();
        let (arg_kind, param_kind) = (types.kind(types.host(arg)), types.kind(types.host(param)));
        match (arg_kind, param_kind) {
            (TypeKind::Integer { size: from, signed: a }, TypeKind::Integer { size: to, signed: b }) => {
                if from < to {
                    (90 - (to - from)) as Conversion
                } else if from == to && a != b {
                    88
                } else {
                    50
                }
            }
            (TypeKind::Integer { .. }, TypeKind::Real { .. }) => 60,
            (TypeKind::Real { size: from }, TypeKind::Real { size: to }) => {
                if from <= to {
                    (85 - (to - from)) as Conversion
                } else {
                    50
                }
            }
            (TypeKind::Boolean { .. }, TypeKind::Boolean { .. }) => 90,
            (TypeKind::Char { size: from }, TypeKind::Char { size: to }) => {
                if from <= to {
                    80
                } else {
                    50
                }
            }
            (TypeKind::Char { .. }, TypeKind::String(_)) => 75,
            (TypeKind::String(_), TypeKind::String(_)) => 78,
            (TypeKind::Set { element: None }, TypeKind::Set { .. }) => 90,
            (TypeKind::Set { element: Some(a) }, TypeKind::Set { element: Some(b) }) => {
                if self.conversion(*a, *b) >= 50 {
                    80
                } else {
                    INCOMPATIBLE
                }
            }
            (TypeKind::Pointer { .. }, TypeKind::Pointer { target: None, .. }) => 70,
            (TypeKind::Pointer { target: None, .. }, TypeKind::Pointer { .. }) => 60,
            (TypeKind::Array { element: a, .. }, TypeKind::Array { element: b, kind }) => {
                if *kind == super::ty::ArrayKind::Open && self.conversion(*a, *b) >= 90 {
                    80
                } else {
                    INCOMPATIBLE
                }
            }
            _ => INCOMPATIBLE,
        }
    }

    /// Whether either type declares `class operator Implicit(arg): param`.
    fn has_implicit_operator(&self, arg: TypeId, param: TypeId) -> bool {
        let types = self.table.types();
        [arg, param]
            .into_iter()
            .filter_map(|ty| types.struct_type(ty).map(|data| data.scope))
            .any(|scope| {
                self.table.scope(scope).declarations().any(|id| {
                    let decl = self.table.declaration(id);
                    decl.method().is_some_and(|method| {
                        method.kind == MethodKind::Operator
                            && decl.name.eq_ignore_case("Implicit")
                            && method.params.len() == 1
                            && method.params[0].ty == arg
                            && method.return_type == param
                    })
                })
            })
    }
}

/// At least as good everywhere and better somewhere.
fn dominates(a: &[Conversion], b: &[Conversion]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x >= y) && a.iter().zip(b).any(|(x, y)| x > y)
}
