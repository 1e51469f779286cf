//! Semantic identifiers.
//!
//! Every entity the resolver creates lives in an arena owned by the
//! [`SymbolTable`](super::SymbolTable) and is addressed by one of these
//! index newtypes. They are `Copy`, cheap to hash, and stable for the
//! lifetime of the table, so references between entities (a scope's parent,
//! a type's ancestors, a declaration's scope) never form ownership cycles.

use std::fmt;

use crate::base::LineCol;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        pub struct $name(u32);

        impl $name {
            /// Create an id from a raw arena index.
            #[inline]
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            /// Get the raw index.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub(crate) fn from_len(len: usize) -> Self {
                Self(u32::try_from(len).unwrap_or(u32::MAX))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "({})"), self.0)
            }
        }
    };
}

arena_id!(
    /// A unit (one source file, or the synthetic System unit).
    UnitId,
    "UnitId"
);
arena_id!(
    /// A lexical or type scope.
    ScopeId,
    "ScopeId"
);
arena_id!(
    /// A declaration. Declaration order is creation order.
    DeclId,
    "DeclId"
);
arena_id!(
    /// A type in the [`TypeTable`](super::TypeTable).
    TypeId,
    "TypeId"
);

/// A position inside a specific unit.
///
/// Bindings, usages and node scopes are keyed by the location of the
/// identifier token that introduced them.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Location {
    pub unit: UnitId,
    pub pos: LineCol,
}

impl Location {
    #[inline]
    pub const fn new(unit: UnitId, pos: LineCol) -> Self {
        Self { unit, pos }
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location({}@{})", self.unit.0, self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_order_by_index() {
        assert!(DeclId::new(1) < DeclId::new(2));
        assert_eq!(DeclId::new(7).index(), 7);
        assert_eq!(format!("{:?}", ScopeId::new(3)), "ScopeId(3)");
    }

    #[test]
    fn test_location_equality() {
        let a = Location::new(UnitId::new(0), LineCol::new(4, 2));
        let b = Location::new(UnitId::new(0), LineCol::new(4, 2));
        let c = Location::new(UnitId::new(1), LineCol::new(4, 2));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(format!("{:?}", a), "Location(0@5:3)");
    }

    #[test]
    fn test_id_size() {
        assert_eq!(std::mem::size_of::<TypeId>(), 4);
        assert_eq!(std::mem::size_of::<Location>(), 12);
    }
}
