//! Construction-time failures.
//!
//! Only invariant violations that would make the scope graph unusable are
//! errors. Unresolved and ambiguous references are reported as
//! [`Diagnostic`](crate::hir::Diagnostic)s instead and never abort a build.

use smol_str::SmolStr;
use thiserror::Error;

/// An unrecoverable problem found while building the symbol table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemaError {
    /// A type would (transitively) inherit from itself.
    #[error("cyclic ancestry: '{ty}' cannot descend from '{ancestor}'")]
    CyclicAncestry { ty: SmolStr, ancestor: SmolStr },

    /// Two source units with the same name were handed to the builder.
    #[error("duplicate unit '{0}'")]
    DuplicateUnit(SmolStr),
}

/// Result alias for symbol-table construction.
pub type Result<T, E = SemaError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SemaError::CyclicAncestry {
            ty: "Unit1.TA".into(),
            ancestor: "Unit1.TB".into(),
        };
        assert_eq!(
            err.to_string(),
            "cyclic ancestry: 'Unit1.TA' cannot descend from 'Unit1.TB'"
        );
        assert_eq!(
            SemaError::DuplicateUnit("Unit1".into()).to_string(),
            "duplicate unit 'Unit1'"
        );
    }
}
