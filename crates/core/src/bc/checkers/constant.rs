use std::collections::HashSet;

use crate::bc::incident::{Incident, IncidentType};
use crate::bc::{BcError, Checker};
use crate::db::Snapshot;

/// Detects deleted global constants. Value changes are not breaks; only the
/// name disappearing is.
pub struct ConstantChecker;

impl Checker for ConstantChecker {
    fn name(&self) -> &str {
        "constant"
    }

    fn collect(
        &self,
        source: &dyn Snapshot,
        target: &dyn Snapshot,
    ) -> Result<Vec<Incident>, BcError> {
        let target_names: HashSet<String> = target.constant_names()?.into_iter().collect();

        let mut incidents = Vec::new();
        for name in source.constant_names()? {
            if !target_names.contains(&name) {
                incidents.push(Incident::new(IncidentType::ConstantDeleted, name));
            }
        }
        Ok(incidents)
    }
}
