use crate::bc::incident::{Incident, IncidentType};
use crate::bc::signature::{is_signature_compatible, render_signature};
use crate::bc::{BcError, Checker};
use crate::db::{ParameterOwner, Snapshot};

use super::index_last_wins;

/// Detects breaks on free functions: deletions and incompatible signature
/// edits. Unlike methods, a signature only counts as broken when the
/// compatibility rules say existing calls would no longer work, so adding
/// trailing defaulted parameters passes silently.
pub struct FunctionChecker;

impl Checker for FunctionChecker {
    fn name(&self) -> &str {
        "function"
    }

    fn collect(
        &self,
        source: &dyn Snapshot,
        target: &dyn Snapshot,
    ) -> Result<Vec<Incident>, BcError> {
        let (order, source_functions) =
            index_last_wins(source.functions()?, |function| function.name.as_str());
        let (_, target_functions) =
            index_last_wins(target.functions()?, |function| function.name.as_str());

        let mut incidents = Vec::new();
        for name in &order {
            let function = match source_functions.get(name) {
                Some(function) => function,
                None => continue,
            };
            let target_function = match target_functions.get(name) {
                Some(function) => function,
                None => {
                    incidents.push(Incident::new(IncidentType::FunctionDeleted, name.clone()));
                    continue;
                }
            };

            let source_signature =
                render_signature(&source.parameters(ParameterOwner::Function(function.id))?);
            let target_signature =
                render_signature(&target.parameters(ParameterOwner::Function(target_function.id))?);
            if !is_signature_compatible(&source_signature, &target_signature) {
                incidents.push(Incident::with_change(
                    IncidentType::FunctionSignatureChanged,
                    name.clone(),
                    source_signature,
                    target_signature,
                ));
            }
        }
        Ok(incidents)
    }
}
