use crate::bc::incident::Incident;

use super::{ReportError, Reporter};

/// Machine-readable report: the incident list as pretty-printed JSON, in
/// production order and without grouping, so downstream tooling can apply
/// its own presentation.
pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn name(&self) -> &str {
        "json"
    }

    fn generate(&self, incidents: &[Incident]) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(incidents)?)
    }
}
