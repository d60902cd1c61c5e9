use serde::{Deserialize, Serialize};

use crate::bc::incident::{Incident, IncidentType};

/// One known break to drop from reports.
///
/// Every field that is present must match the incident exactly; omitted
/// fields match anything. A rule naming `old` or `new` only matches
/// incidents that actually carry those values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IgnoreRule {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub incident_type: Option<IncidentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new: Option<String>,
}

impl IgnoreRule {
    pub fn matches(&self, incident: &Incident) -> bool {
        if let Some(incident_type) = self.incident_type {
            if incident_type != incident.incident_type {
                return false;
            }
        }
        if let Some(element) = &self.element {
            if *element != incident.element {
                return false;
            }
        }
        if let Some(old) = &self.old {
            if incident.old.as_deref() != Some(old.as_str()) {
                return false;
            }
        }
        if let Some(new) = &self.new {
            if incident.new.as_deref() != Some(new.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Drop incidents matched by any rule, keeping the rest in order.
pub fn remove_matching(incidents: Vec<Incident>, rules: &[IgnoreRule]) -> Vec<Incident> {
    if rules.is_empty() {
        return incidents;
    }
    incidents
        .into_iter()
        .filter(|incident| !rules.iter().any(|rule| rule.matches(incident)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_fields_match_anything() {
        let rule = IgnoreRule {
            incident_type: Some(IncidentType::MethodDeleted),
            ..IgnoreRule::default()
        };
        assert!(rule.matches(&Incident::new(IncidentType::MethodDeleted, "A::run")));
        assert!(rule.matches(&Incident::new(IncidentType::MethodDeleted, "B::run")));
        assert!(!rule.matches(&Incident::new(IncidentType::ClassDeleted, "A")));
    }

    #[test]
    fn change_fields_require_presence() {
        let rule = IgnoreRule { old: Some("public".to_string()), ..IgnoreRule::default() };
        let with_change = Incident::with_change(
            IncidentType::MethodScopeReduced,
            "A::run",
            "public",
            "protected",
        );
        let without_change = Incident::new(IncidentType::MethodDeleted, "A::run");
        assert!(rule.matches(&with_change));
        assert!(!rule.matches(&without_change));
    }

    #[test]
    fn an_empty_rule_set_is_the_identity() {
        let incidents = vec![
            Incident::new(IncidentType::ClassDeleted, "A"),
            Incident::with_change(IncidentType::MethodScopeReduced, "A::run", "public", "private"),
        ];
        assert_eq!(remove_matching(incidents.clone(), &[]), incidents);
    }

    #[test]
    fn filtering_twice_removes_nothing_more() {
        let incidents = vec![
            Incident::new(IncidentType::ClassDeleted, "A"),
            Incident::new(IncidentType::ClassDeleted, "B"),
        ];
        let rules =
            vec![IgnoreRule { element: Some("A".to_string()), ..IgnoreRule::default() }];
        let once = remove_matching(incidents, &rules);
        let twice = remove_matching(once.clone(), &rules);
        assert_eq!(twice, once);
        assert_eq!(once.len(), 1);
    }

    #[test]
    fn filtering_preserves_order_of_survivors() {
        let incidents = vec![
            Incident::new(IncidentType::ClassDeleted, "A"),
            Incident::new(IncidentType::ClassDeleted, "B"),
            Incident::new(IncidentType::ClassDeleted, "C"),
        ];
        let rules =
            vec![IgnoreRule { element: Some("B".to_string()), ..IgnoreRule::default() }];
        let kept = remove_matching(incidents, &rules);
        let elements: Vec<&str> = kept.iter().map(|i| i.element.as_str()).collect();
        assert_eq!(elements, ["A", "C"]);
    }

    #[test]
    fn rules_deserialize_from_wire_tags() {
        let rule: IgnoreRule =
            serde_json::from_str(r#"{"type":"class.deleted","element":"Legacy"}"#)
                .expect("parse rule");
        assert_eq!(rule.incident_type, Some(IncidentType::ClassDeleted));
        assert_eq!(rule.element.as_deref(), Some("Legacy"));
        assert_eq!(rule.old, None);
    }
}
