use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of a detected break.
///
/// The wire tag (`as_str`) is stable across releases; reports emit it and
/// ignore rules match on it, so renaming a variant's tag is itself a
/// breaking change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum IncidentType {
    #[serde(rename = "class.deleted")]
    ClassDeleted,
    #[serde(rename = "class.made_abstract")]
    ClassMadeAbstract,
    #[serde(rename = "class.made_final")]
    ClassMadeFinal,
    #[serde(rename = "class.constant.deleted")]
    ClassConstantDeleted,
    #[serde(rename = "property.deleted")]
    PropertyDeleted,
    #[serde(rename = "property.made_static")]
    PropertyMadeStatic,
    #[serde(rename = "property.made_non_static")]
    PropertyMadeNonStatic,
    #[serde(rename = "property.scope_reduced")]
    PropertyScopeReduced,
    #[serde(rename = "method.deleted")]
    MethodDeleted,
    #[serde(rename = "method.made_abstract")]
    MethodMadeAbstract,
    #[serde(rename = "method.made_final")]
    MethodMadeFinal,
    #[serde(rename = "method.made_static")]
    MethodMadeStatic,
    #[serde(rename = "method.made_non_static")]
    MethodMadeNonStatic,
    #[serde(rename = "method.scope_reduced")]
    MethodScopeReduced,
    #[serde(rename = "method.signature_changed")]
    MethodSignatureChanged,
    #[serde(rename = "function.deleted")]
    FunctionDeleted,
    #[serde(rename = "function.signature_changed")]
    FunctionSignatureChanged,
    #[serde(rename = "constant.deleted")]
    ConstantDeleted,
}

impl IncidentType {
    /// Stable wire tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClassDeleted => "class.deleted",
            Self::ClassMadeAbstract => "class.made_abstract",
            Self::ClassMadeFinal => "class.made_final",
            Self::ClassConstantDeleted => "class.constant.deleted",
            Self::PropertyDeleted => "property.deleted",
            Self::PropertyMadeStatic => "property.made_static",
            Self::PropertyMadeNonStatic => "property.made_non_static",
            Self::PropertyScopeReduced => "property.scope_reduced",
            Self::MethodDeleted => "method.deleted",
            Self::MethodMadeAbstract => "method.made_abstract",
            Self::MethodMadeFinal => "method.made_final",
            Self::MethodMadeStatic => "method.made_static",
            Self::MethodMadeNonStatic => "method.made_non_static",
            Self::MethodScopeReduced => "method.scope_reduced",
            Self::MethodSignatureChanged => "method.signature_changed",
            Self::FunctionDeleted => "function.deleted",
            Self::FunctionSignatureChanged => "function.signature_changed",
            Self::ConstantDeleted => "constant.deleted",
        }
    }

    /// Human-friendly heading derived from the wire tag, e.g.
    /// `class.made_abstract` becomes `Class Made Abstract`.
    pub fn humanized(self) -> String {
        let mut words = Vec::new();
        for word in self.as_str().split(['.', '_']) {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    words.push(format!("{}{}", first.to_ascii_uppercase(), chars.as_str()))
                }
                None => continue,
            }
        }
        words.join(" ")
    }
}

impl fmt::Display for IncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single detected backwards compatibility break.
///
/// `element` identifies what broke (`Class`, `Class::CONSTANT`,
/// `Class::$property`, `Class::method`, `function`, `CONSTANT`). `old` and
/// `new` carry the before/after detail when the break is a change rather
/// than a removal, and are always set together.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Incident {
    #[serde(rename = "type")]
    pub incident_type: IncidentType,
    pub element: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new: Option<String>,
}

impl Incident {
    pub fn new(incident_type: IncidentType, element: impl Into<String>) -> Self {
        Self { incident_type, element: element.into(), old: None, new: None }
    }

    pub fn with_change(
        incident_type: IncidentType,
        element: impl Into<String>,
        old: impl Into<String>,
        new: impl Into<String>,
    ) -> Self {
        Self {
            incident_type,
            element: element.into(),
            old: Some(old.into()),
            new: Some(new.into()),
        }
    }
}

/// Stable-sort incidents into the order given by `priority`; types missing
/// from the table sort last, and ties keep their production order.
pub fn sort_by_type_priority(incidents: &mut [Incident], priority: &[IncidentType]) {
    incidents.sort_by_key(|incident| {
        priority
            .iter()
            .position(|candidate| *candidate == incident.incident_type)
            .unwrap_or(usize::MAX)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_tags_round_trip_through_serde() {
        let incident = Incident::new(IncidentType::ClassConstantDeleted, "Order::STATUS_NEW");
        let json = serde_json::to_string(&incident).expect("serialize");
        assert!(json.contains(r#""type":"class.constant.deleted""#));
        let back: Incident = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, incident);
    }

    #[test]
    fn absent_change_fields_are_omitted() {
        let incident = Incident::new(IncidentType::ClassDeleted, "Order");
        let json = serde_json::to_string(&incident).expect("serialize");
        assert!(!json.contains("old"));
        assert!(!json.contains("new"));
    }

    #[test]
    fn humanized_headings() {
        assert_eq!(IncidentType::ClassMadeAbstract.humanized(), "Class Made Abstract");
        assert_eq!(IncidentType::ClassConstantDeleted.humanized(), "Class Constant Deleted");
        assert_eq!(IncidentType::MethodSignatureChanged.humanized(), "Method Signature Changed");
    }

    #[test]
    fn priority_sort_is_stable_and_puts_unlisted_types_last() {
        let mut incidents = vec![
            Incident::new(IncidentType::MethodDeleted, "A::first"),
            Incident::new(IncidentType::ConstantDeleted, "LIMIT"),
            Incident::new(IncidentType::ClassDeleted, "B"),
            Incident::new(IncidentType::MethodDeleted, "A::second"),
        ];
        sort_by_type_priority(
            &mut incidents,
            &[IncidentType::ClassDeleted, IncidentType::MethodDeleted],
        );
        let elements: Vec<&str> = incidents.iter().map(|i| i.element.as_str()).collect();
        assert_eq!(elements, ["B", "A::first", "A::second", "LIMIT"]);
    }
}
