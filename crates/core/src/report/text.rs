use crate::bc::incident::Incident;

use super::{group_by_type, sorted_by_element, ReportError, Reporter, NO_BREAKS_MESSAGE};

/// Plain-text report for terminals: one heading per incident type with a
/// bullet per element, and indented OLD/NEW lines when a break is a change.
pub struct TextReporter;

impl Reporter for TextReporter {
    fn name(&self) -> &str {
        "text"
    }

    fn generate(&self, incidents: &[Incident]) -> Result<String, ReportError> {
        if incidents.is_empty() {
            return Ok(NO_BREAKS_MESSAGE.to_string());
        }

        let mut out = String::from("Backward compatibility breaks:\n");
        for (incident_type, members) in group_by_type(incidents) {
            out.push('\n');
            out.push_str(&format!(
                "=== {} ({}) ===\n",
                incident_type.humanized(),
                members.len()
            ));

            for incident in sorted_by_element(&members) {
                match (&incident.old, &incident.new) {
                    (Some(old), Some(new)) => {
                        out.push_str(&format!(" * {}\n", incident.element));
                        out.push_str(&format!("   OLD: {old}\n"));
                        out.push_str(&format!("   NEW: {new}\n"));
                        out.push('\n');
                    }
                    _ => out.push_str(&format!(" * {}\n", incident.element)),
                }
            }
        }
        Ok(out)
    }
}
