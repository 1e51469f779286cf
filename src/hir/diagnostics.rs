//! Diagnostics: advisory findings from symbol table construction.
//!
//! Nothing in here aborts a build. An unresolved name, an ambiguous call or a
//! missing unit is recorded and resolution carries on; callers decide what to
//! surface. Construction-time failures that make the table unusable are
//! [`SemaError`](crate::SemaError)s instead.

use std::fmt;
use std::sync::Arc;

use super::ids::{Location, UnitId};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    /// Where the finding was made.
    pub location: Location,
    /// Severity level.
    pub severity: Severity,
    /// Diagnostic code (e.g., "D0001").
    pub code: Option<Arc<str>>,
    /// The diagnostic message.
    pub message: Arc<str>,
    /// Optional related information.
    pub related: Vec<RelatedInfo>,
}

/// Related information for a diagnostic.
#[derive(Clone, Debug, PartialEq)]
pub struct RelatedInfo {
    pub location: Location,
    pub message: Arc<str>,
}

impl Diagnostic {
    /// Create a new warning diagnostic.
    pub fn warning(location: Location, message: impl Into<Arc<str>>) -> Self {
        Self {
            location,
            severity: Severity::Warning,
            code: None,
            message: message.into(),
            related: Vec::new(),
        }
    }

    /// Create a new informational diagnostic.
    pub fn info(location: Location, message: impl Into<Arc<str>>) -> Self {
        Self {
            severity: Severity::Info,
            ..Self::warning(location, message)
        }
    }

    /// Set the diagnostic code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Add related information.
    pub fn with_related(mut self, location: Location, message: impl Into<Arc<str>>) -> Self {
        self.related.push(RelatedInfo {
            location,
            message: message.into(),
        });
        self
    }
}

impl fmt::Display for Diagnostic {
    /// `1:5 warning[D0001]: unresolved name: 'Foo'`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Hint => "hint",
        };
        write!(f, "{} {}", self.location.pos, severity)?;
        if let Some(code) = &self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Diagnostic codes.
pub mod codes {
    /// A name reference that no scope declares.
    pub const UNRESOLVED_NAME: &str = "D0001";
    /// A call or operator with more than one equally good candidate.
    pub const AMBIGUOUS_CALL: &str = "D0002";
    /// A `uses` entry naming a unit that was never supplied.
    pub const UNKNOWN_UNIT: &str = "D0003";
    /// Interface `uses` clauses forming a cycle.
    pub const CIRCULAR_UNIT_REFERENCE: &str = "D0004";
    /// A second declaration with the same name and signature in one scope.
    pub const DUPLICATE_DECLARATION: &str = "D0005";
    /// A method implementation with no matching declaration in its type.
    pub const UNMATCHED_IMPLEMENTATION: &str = "D0006";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during symbol table construction.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn unresolved_name(&mut self, location: Location, name: &str) {
        self.add(
            Diagnostic::warning(location, format!("unresolved name: '{}'", name))
                .with_code(codes::UNRESOLVED_NAME),
        );
    }

    /// Ambiguity is advisory: resolution already picked `chosen`.
    pub fn ambiguous_call(&mut self, location: Location, name: &str, chosen: &str, candidates: &[(Location, String)]) {
        let mut diag = Diagnostic::info(
            location,
            format!("ambiguous call to '{}': {} equally good candidates, chose {}", name, candidates.len(), chosen),
        )
        .with_code(codes::AMBIGUOUS_CALL);
        for (candidate, image) in candidates {
            diag = diag.with_related(*candidate, format!("candidate: {}", image));
        }
        self.add(diag);
    }

    pub fn unknown_unit(&mut self, location: Location, name: &str) {
        self.add(
            Diagnostic::warning(location, format!("unknown unit: '{}'", name)).with_code(codes::UNKNOWN_UNIT),
        );
    }

    pub fn circular_unit_reference(&mut self, location: Location, unit: &str, cycle: &[String]) {
        self.add(
            Diagnostic::warning(
                location,
                format!("circular interface uses in '{}': {}", unit, cycle.join(" -> ")),
            )
            .with_code(codes::CIRCULAR_UNIT_REFERENCE),
        );
    }

    pub fn duplicate_declaration(&mut self, location: Location, name: &str, existing: Location) {
        self.add(
            Diagnostic::warning(location, format!("duplicate declaration: '{}' is already declared", name))
                .with_code(codes::DUPLICATE_DECLARATION)
                .with_related(existing, format!("previous declaration of '{}'", name)),
        );
    }

    pub fn unmatched_implementation(&mut self, location: Location, name: &str) {
        self.add(
            Diagnostic::warning(location, format!("no declaration matches implementation of '{}'", name))
                .with_code(codes::UNMATCHED_IMPLEMENTATION),
        );
    }

    /// Get all diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get diagnostics for a specific unit.
    pub fn diagnostics_for_unit(&self, unit: UnitId) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.location.unit == unit).collect()
    }

    /// Get the number of warnings.
    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning).count()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Move every diagnostic of `other` to the end of this collector.
    pub fn extend(&mut self, other: DiagnosticCollector) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::LineCol;

    fn loc(unit: u32, line: u32, col: u32) -> Location {
        Location::new(UnitId::new(unit), LineCol::new(line, col))
    }

    #[test]
    fn test_diagnostic_with_code() {
        let diag = Diagnostic::warning(loc(0, 0, 0), "test").with_code(codes::UNRESOLVED_NAME);
        assert_eq!(diag.code.as_deref(), Some("D0001"));
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.to_string(), "1:1 warning[D0001]: test");
    }

    #[test]
    fn test_ambiguous_call_is_informational() {
        let mut collector = DiagnosticCollector::new();
        collector.ambiguous_call(
            loc(0, 3, 4),
            "Foo",
            "Foo(Integer)",
            &[(loc(0, 1, 0), "Foo(Integer)".into()), (loc(0, 2, 0), "Foo(Int64)".into())],
        );

        let diag = &collector.diagnostics()[0];
        assert_eq!(diag.severity, Severity::Info);
        assert_eq!(diag.related.len(), 2);
        assert!(diag.message.contains("chose Foo(Integer)"));
        assert_eq!(collector.warning_count(), 0);
    }

    #[test]
    fn test_collector_by_unit() {
        let mut collector = DiagnosticCollector::new();
        collector.unresolved_name(loc(0, 0, 0), "A");
        collector.unresolved_name(loc(1, 0, 0), "B");
        collector.unknown_unit(loc(0, 1, 0), "Missing");

        assert_eq!(collector.diagnostics_for_unit(UnitId::new(0)).len(), 2);
        assert_eq!(collector.diagnostics_for_unit(UnitId::new(1)).len(), 1);
        assert_eq!(collector.warning_count(), 3);
    }

    #[test]
    fn test_extend_keeps_order() {
        let mut first = DiagnosticCollector::new();
        first.unresolved_name(loc(0, 0, 0), "A");
        let mut second = DiagnosticCollector::new();
        second.unresolved_name(loc(1, 0, 0), "B");

        first.extend(second);
        let names: Vec<_> = first.take().into_iter().map(|d| d.message).collect();
        assert_eq!(&*names[0], "unresolved name: 'A'");
        assert_eq!(&*names[1], "unresolved name: 'B'");
        assert!(first.is_empty());
    }
}
