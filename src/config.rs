//! Analysis configuration.
//!
//! Mirrors the project options a Delphi compiler is invoked with that
//! influence name resolution. Loading these from project files is the
//! host's business; this crate only consumes them.

use indexmap::IndexMap;

use crate::base::Name;

/// Options that influence how unit references are resolved.
#[derive(Clone, Debug)]
pub struct AnalysisConfig {
    /// Namespace prefixes tried for bare unit names (`SysUtils` → `System.SysUtils`).
    unit_scope_names: Vec<Name>,
    /// Unit aliases (`WinTypes` → `Windows`).
    unit_aliases: IndexMap<Name, Name>,
    /// Resolve unit bodies on the rayon thread pool.
    parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            unit_scope_names: Vec::new(),
            unit_aliases: IndexMap::new(),
            parallel: true,
        }
    }
}

impl AnalysisConfig {
    /// Create a configuration with no scope names or aliases.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit scope name.
    pub fn with_unit_scope_name(mut self, scope: impl Into<Name>) -> Self {
        let scope = scope.into();
        if !self.unit_scope_names.contains(&scope) {
            self.unit_scope_names.push(scope);
        }
        self
    }

    /// Add a unit alias.
    pub fn with_unit_alias(mut self, alias: impl Into<Name>, target: impl Into<Name>) -> Self {
        self.unit_aliases.insert(alias.into(), target.into());
        self
    }

    /// Enable or disable parallel body resolution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn unit_scope_names(&self) -> &[Name] {
        &self.unit_scope_names
    }

    pub fn unit_alias(&self, name: &Name) -> Option<&Name> {
        self.unit_aliases.get(name)
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Every spelling a `uses` entry may refer to, most specific first.
    ///
    /// The alias target (if any) replaces the name, then the name is tried
    /// as written and with each unit scope name prepended.
    pub fn unit_name_candidates(&self, name: &Name) -> Vec<Name> {
        let name = self.unit_alias(name).unwrap_or(name);
        let mut candidates = vec![name.clone()];
        for scope in &self.unit_scope_names {
            candidates.push(scope.join(name));
        }
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_name_candidates_with_scope_names() {
        let config = AnalysisConfig::new()
            .with_unit_scope_name("System")
            .with_unit_scope_name("Vcl");

        let candidates = config.unit_name_candidates(&Name::new("SysUtils"));
        assert_eq!(
            candidates,
            vec![
                Name::new("SysUtils"),
                Name::new("System.SysUtils"),
                Name::new("Vcl.SysUtils"),
            ]
        );
    }

    #[test]
    fn test_unit_alias_replaces_name() {
        let config = AnalysisConfig::new().with_unit_alias("WinTypes", "Windows");
        assert_eq!(
            config.unit_name_candidates(&Name::new("wintypes")),
            vec![Name::new("Windows")]
        );
    }

    #[test]
    fn test_duplicate_scope_names_are_ignored() {
        let config = AnalysisConfig::new()
            .with_unit_scope_name("System")
            .with_unit_scope_name("system");
        assert_eq!(config.unit_scope_names().len(), 1);
        assert!(config.parallel());
    }
}
