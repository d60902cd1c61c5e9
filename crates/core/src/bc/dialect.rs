/// Framework-specific reporting policy injected into the class checker.
///
/// A dialect can canonicalize rendered signatures (so known-equivalent
/// spellings don't show up as signature changes) and exempt conventional
/// override points from scope-reduction reports. The canonical form is what
/// gets compared and reported.
pub trait DialectPolicy: Send + Sync {
    /// Canonical form of a rendered signature for comparison purposes.
    fn normalize_signature(&self, class_name: &str, signature: &str) -> String {
        let _ = class_name;
        signature.to_string()
    }

    /// Whether a scope reduction on this method is conventional and should
    /// not be reported. `source_signature` is the normalized source-side
    /// rendering.
    fn suppresses_scope_reduction(
        &self,
        class_name: &str,
        method_name: &str,
        source_signature: &str,
    ) -> bool {
        let _ = (class_name, method_name, source_signature);
        false
    }
}

/// Policy that changes nothing; the plain class checker uses this.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDialect;

impl DialectPolicy for NullDialect {}

/// Policy for In-Portal codebases.
///
/// Event handlers (`*EventHandler` plus the legacy admin handler) route
/// every `On*` event through dispatch, and tag processors expose tags as
/// `array $params` methods; both families were migrated wholesale between
/// framework versions, so their conventional churn is not worth reporting.
#[derive(Debug, Clone, Copy, Default)]
pub struct InPortalDialect;

const ADMIN_HANDLER_CLASS: &str = "AdminEventsHandler";
const SCOPE_EXEMPT_METHODS: [&str; 2] = ["mapPermissions", "SetCustomQuery"];
const TAG_SIGNATURE: &str = "array $params";

impl InPortalDialect {
    fn is_event_handler(class_name: &str) -> bool {
        class_name.ends_with("EventHandler") || class_name == ADMIN_HANDLER_CLASS
    }

    fn is_tag_processor(class_name: &str) -> bool {
        class_name.ends_with("TagProcessor")
    }

    /// `&$event`, `kEvent $event` and `\kEvent $event` (and combinations)
    /// all collapse to `$event`; anything else passes through.
    fn normalize_event_parameter(token: &str) -> String {
        let stripped = token
            .strip_prefix("\\kEvent ")
            .or_else(|| token.strip_prefix("kEvent "))
            .unwrap_or(token);
        let stripped = stripped.strip_prefix('&').unwrap_or(stripped);
        if stripped == "$event" {
            stripped.to_string()
        } else {
            token.to_string()
        }
    }

    /// Bare `$params` gains the `array` hint, defaults included, so both
    /// historical spellings of a tag signature compare equal.
    fn normalize_tag_parameter(token: &str) -> String {
        if token == "$params" || token.starts_with("$params ") {
            format!("array {token}")
        } else {
            token.to_string()
        }
    }
}

impl DialectPolicy for InPortalDialect {
    fn normalize_signature(&self, class_name: &str, signature: &str) -> String {
        if Self::is_event_handler(class_name) {
            signature
                .split(", ")
                .map(Self::normalize_event_parameter)
                .collect::<Vec<_>>()
                .join(", ")
        } else if Self::is_tag_processor(class_name) {
            signature
                .split(", ")
                .map(Self::normalize_tag_parameter)
                .collect::<Vec<_>>()
                .join(", ")
        } else {
            signature.to_string()
        }
    }

    fn suppresses_scope_reduction(
        &self,
        class_name: &str,
        method_name: &str,
        source_signature: &str,
    ) -> bool {
        if Self::is_event_handler(class_name) {
            method_name.starts_with("On") || SCOPE_EXEMPT_METHODS.contains(&method_name)
        } else if Self::is_tag_processor(class_name) {
            source_signature == TAG_SIGNATURE
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_parameter_spellings_collapse() {
        let dialect = InPortalDialect;
        for spelling in ["$event", "&$event", "kEvent $event", "\\kEvent $event", "kEvent &$event"]
        {
            assert_eq!(
                dialect.normalize_signature("CategoryEventHandler", spelling),
                "$event",
                "spelling {spelling:?}"
            );
        }
        // Other parameters are left alone, including on the legacy admin handler.
        assert_eq!(
            dialect.normalize_signature("AdminEventsHandler", "kEvent $event, $extra"),
            "$event, $extra"
        );
        assert_eq!(
            dialect.normalize_signature("CategoryEventHandler", "kEvent $other"),
            "kEvent $other"
        );
    }

    #[test]
    fn tag_signature_spellings_collapse() {
        let dialect = InPortalDialect;
        assert_eq!(dialect.normalize_signature("PageTagProcessor", "$params"), "array $params");
        assert_eq!(
            dialect.normalize_signature("PageTagProcessor", "array $params"),
            "array $params"
        );
        assert_eq!(
            dialect.normalize_signature("PageTagProcessor", "$params = array()"),
            "array $params = array()"
        );
        // Non-matching classes are untouched.
        assert_eq!(dialect.normalize_signature("PageHelper", "$params"), "$params");
    }

    #[test]
    fn event_handlers_exempt_events_and_legacy_methods_from_scope_checks() {
        let dialect = InPortalDialect;
        assert!(dialect.suppresses_scope_reduction("CategoryEventHandler", "OnSave", "$event"));
        assert!(dialect.suppresses_scope_reduction(
            "CategoryEventHandler",
            "mapPermissions",
            ""
        ));
        assert!(dialect.suppresses_scope_reduction("AdminEventsHandler", "OnStartup", "$event"));
        assert!(!dialect.suppresses_scope_reduction("CategoryEventHandler", "getHelper", ""));
    }

    #[test]
    fn tag_processors_exempt_tags_from_scope_checks() {
        let dialect = InPortalDialect;
        assert!(dialect.suppresses_scope_reduction(
            "PageTagProcessor",
            "PageLink",
            "array $params"
        ));
        assert!(!dialect.suppresses_scope_reduction("PageTagProcessor", "Init", "$id"));
        assert!(!dialect.suppresses_scope_reduction("PageHelper", "PageLink", "array $params"));
    }

    #[test]
    fn null_dialect_changes_nothing() {
        let dialect = NullDialect;
        assert_eq!(dialect.normalize_signature("AnyClass", "&$event"), "&$event");
        assert!(!dialect.suppresses_scope_reduction("AnyClass", "OnSave", "$event"));
    }
}
