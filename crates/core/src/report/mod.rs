//! Rendering of detected breaks into presentable reports.
//!
//! A [`Reporter`] turns the incident list a check run produced into one
//! output document. Reporters are looked up by name in a
//! [`ReporterRegistry`], mirroring how checkers are selected. All reporters
//! receive incidents in production order; the text and HTML reporters group
//! them by type (in first-appearance order) and sort each group by element,
//! while the JSON reporter preserves the raw list for machine consumers.

use std::collections::HashMap;

use thiserror::Error;

use crate::bc::incident::{Incident, IncidentType};

mod html;
mod json;
mod text;

pub use html::HtmlReporter;
pub use json::JsonReporter;
pub use text::TextReporter;

/// Message shown when a comparison found nothing to report.
pub const NO_BREAKS_MESSAGE: &str = "No backwards compatibility breaks detected.";

/// Errors raised while rendering a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Registering two reporters under one name is a wiring bug.
    #[error("reporter {0:?} is already registered")]
    DuplicateReporter(String),

    /// A caller asked for a reporter that was never registered.
    #[error("reporter {0:?} is not registered")]
    UnknownReporter(String),

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

/// One output format for a break report.
pub trait Reporter: Send + Sync {
    /// Registry name, also usable as a format selector on the command line.
    fn name(&self) -> &str;

    /// Renders the report for the given incidents.
    fn generate(&self, incidents: &[Incident]) -> Result<String, ReportError>;
}

impl std::fmt::Debug for dyn Reporter + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter").field("name", &self.name()).finish()
    }
}

/// Name-keyed set of reporters.
#[derive(Default)]
pub struct ReporterRegistry {
    reporters: HashMap<String, Box<dyn Reporter>>,
}

impl ReporterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, reporter: Box<dyn Reporter>) -> Result<(), ReportError> {
        let name = reporter.name().to_string();
        if self.reporters.contains_key(&name) {
            return Err(ReportError::DuplicateReporter(name));
        }
        self.reporters.insert(name, reporter);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&dyn Reporter, ReportError> {
        self.reporters
            .get(name)
            .map(|reporter| reporter.as_ref())
            .ok_or_else(|| ReportError::UnknownReporter(name.to_string()))
    }

    /// Registered names, sorted for stable presentation.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.reporters.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Builds the registry with every built-in reporter.
pub fn default_reporter_registry() -> Result<ReporterRegistry, ReportError> {
    let mut registry = ReporterRegistry::new();
    registry.add(Box::new(TextReporter))?;
    registry.add(Box::new(HtmlReporter))?;
    registry.add(Box::new(JsonReporter))?;
    Ok(registry)
}

/// Groups incidents by type, keeping groups in the order their type first
/// appeared and members in production order.
fn group_by_type(incidents: &[Incident]) -> Vec<(IncidentType, Vec<&Incident>)> {
    let mut groups: Vec<(IncidentType, Vec<&Incident>)> = Vec::new();
    for incident in incidents {
        match groups
            .iter_mut()
            .find(|(incident_type, _)| *incident_type == incident.incident_type)
        {
            Some((_, members)) => members.push(incident),
            None => groups.push((incident.incident_type, vec![incident])),
        }
    }
    groups
}

/// Sorts one group's members by element name; equal elements keep their
/// production order.
fn sorted_by_element<'a>(members: &[&'a Incident]) -> Vec<&'a Incident> {
    let mut sorted = members.to_vec();
    sorted.sort_by(|a, b| a.element.cmp(&b.element));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_follow_first_appearance_of_each_type() {
        let incidents = vec![
            Incident::new(IncidentType::MethodDeleted, "A::x"),
            Incident::new(IncidentType::ClassDeleted, "B"),
            Incident::new(IncidentType::MethodDeleted, "A::y"),
        ];
        let groups = group_by_type(&incidents);
        let types: Vec<IncidentType> = groups.iter().map(|(t, _)| *t).collect();
        assert_eq!(
            types,
            [IncidentType::MethodDeleted, IncidentType::ClassDeleted]
        );
        assert_eq!(groups[0].1.len(), 2);
    }

    #[test]
    fn duplicate_reporter_registration_is_rejected() {
        let mut registry = ReporterRegistry::new();
        registry.add(Box::new(TextReporter)).unwrap();
        let err = registry.add(Box::new(TextReporter)).unwrap_err();
        assert!(matches!(err, ReportError::DuplicateReporter(name) if name == "text"));
    }

    #[test]
    fn default_registry_contains_the_builtin_reporters() {
        let registry = default_reporter_registry().unwrap();
        assert_eq!(registry.names(), ["html", "json", "text"]);
        assert!(registry.get("text").is_ok());
        assert!(matches!(
            registry.get("yaml").unwrap_err(),
            ReportError::UnknownReporter(_)
        ));
    }
}
