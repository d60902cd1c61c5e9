//! Backwards-compatibility break detection between two knowledge bases.
//!
//! A [`Checker`] compares the same category of API surface (classes,
//! functions, constants) across a source and a target snapshot and produces
//! [`Incident`]s for everything existing callers could trip over. Checkers
//! are looked up by name in a [`CheckerRegistry`], so a project config can
//! pick which ones run and in what order.
//!
//! Detection is read-only with respect to both snapshots; the only shared
//! state is an optional [`LookupCache`](cache::LookupCache) that memoizes
//! recursive class lookups and never changes what gets reported.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::db::{DbError, Snapshot};

pub mod cache;
pub mod checkers;
pub mod dialect;
pub mod filter;
pub mod incident;
pub mod signature;

pub use cache::{class_lookup_key, LookupCache, MemoryCache, NoopCache};
pub use checkers::{ClassChecker, ConstantChecker, FunctionChecker};
pub use dialect::{DialectPolicy, InPortalDialect, NullDialect};
pub use filter::{remove_matching, IgnoreRule};
pub use incident::{sort_by_type_priority, Incident, IncidentType};
pub use signature::{is_signature_compatible, render_parameter, render_signature};

/// Errors raised while detecting breaks.
#[derive(Debug, Error)]
pub enum BcError {
    #[error(transparent)]
    Db(#[from] DbError),

    /// Registering two checkers under one name is a wiring bug.
    #[error("checker {0:?} is already registered")]
    DuplicateChecker(String),

    /// A config or caller asked for a checker that was never registered.
    #[error("checker {0:?} is not registered")]
    UnknownChecker(String),
}

/// One category of backwards-compatibility checks.
pub trait Checker: Send + Sync {
    /// Registry name, also usable in the `bc_checkers` project setting.
    fn name(&self) -> &str;

    /// Preferred report order of incident types. An empty slice keeps the
    /// production order, which is what every built-in checker uses.
    fn type_priority(&self) -> &[IncidentType] {
        &[]
    }

    /// Gathers incidents in production order.
    fn collect(
        &self,
        source: &dyn Snapshot,
        target: &dyn Snapshot,
    ) -> Result<Vec<Incident>, BcError>;

    /// Detects breaks between two snapshots, applying the checker's type
    /// priority when it defines one.
    fn check(
        &self,
        source: &dyn Snapshot,
        target: &dyn Snapshot,
    ) -> Result<Vec<Incident>, BcError> {
        let mut incidents = self.collect(source, target)?;
        let priority = self.type_priority();
        if !priority.is_empty() {
            sort_by_type_priority(&mut incidents, priority);
        }
        Ok(incidents)
    }
}

impl std::fmt::Debug for dyn Checker + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checker").field("name", &self.name()).finish()
    }
}

/// Name-keyed set of checkers.
#[derive(Default)]
pub struct CheckerRegistry {
    checkers: HashMap<String, Box<dyn Checker>>,
}

impl CheckerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, checker: Box<dyn Checker>) -> Result<(), BcError> {
        let name = checker.name().to_string();
        if self.checkers.contains_key(&name) {
            return Err(BcError::DuplicateChecker(name));
        }
        self.checkers.insert(name, checker);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&dyn Checker, BcError> {
        self.checkers
            .get(name)
            .map(|checker| checker.as_ref())
            .ok_or_else(|| BcError::UnknownChecker(name.to_string()))
    }

    /// Registered names, sorted for stable presentation.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.checkers.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Builds the registry with every built-in checker.
pub fn default_checker_registry(cache: Arc<dyn LookupCache>) -> Result<CheckerRegistry, BcError> {
    let mut registry = CheckerRegistry::new();
    registry.add(Box::new(ClassChecker::new(cache.clone())))?;
    registry.add(Box::new(FunctionChecker))?;
    registry.add(Box::new(ConstantChecker))?;
    registry.add(Box::new(ClassChecker::with_dialect(
        "inportal_class",
        cache,
        Arc::new(InPortalDialect),
    )))?;
    Ok(registry)
}

/// Runs the named checkers in the given order and concatenates their
/// incidents. The per-checker production order is preserved.
pub fn detect_breaks(
    registry: &CheckerRegistry,
    checker_names: &[String],
    source: &dyn Snapshot,
    target: &dyn Snapshot,
) -> Result<Vec<Incident>, BcError> {
    let mut incidents = Vec::new();
    for name in checker_names {
        incidents.extend(registry.get(name)?.check(source, target)?);
    }
    Ok(incidents)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubChecker {
        name: &'static str,
    }

    impl Checker for StubChecker {
        fn name(&self) -> &str {
            self.name
        }

        fn collect(
            &self,
            _source: &dyn Snapshot,
            _target: &dyn Snapshot,
        ) -> Result<Vec<Incident>, BcError> {
            Ok(vec![Incident::new(
                IncidentType::ConstantDeleted,
                self.name,
            )])
        }
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = CheckerRegistry::new();
        registry.add(Box::new(StubChecker { name: "stub" })).unwrap();
        let err = registry
            .add(Box::new(StubChecker { name: "stub" }))
            .unwrap_err();
        assert!(matches!(err, BcError::DuplicateChecker(name) if name == "stub"));
    }

    #[test]
    fn unknown_checker_lookup_fails() {
        let registry = CheckerRegistry::new();
        let err = registry.get("missing").unwrap_err();
        assert!(matches!(err, BcError::UnknownChecker(name) if name == "missing"));
    }

    #[test]
    fn default_registry_contains_the_builtin_checkers() {
        let registry = default_checker_registry(Arc::new(NoopCache)).unwrap();
        assert_eq!(
            registry.names(),
            ["class", "constant", "function", "inportal_class"]
        );
    }
}
