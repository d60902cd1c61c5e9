#![allow(dead_code)]

use std::sync::Arc;

use insight_core::bc::{default_checker_registry, detect_breaks, Incident, NoopCache};
use insight_core::db::KnowledgeBaseDb;
use insight_core::sync::{refresh, ReflectionDump};

/// Sync a dump document into a fresh in-memory knowledge base.
pub fn knowledge_base_from(dump: &ReflectionDump) -> KnowledgeBaseDb {
    let db = KnowledgeBaseDb::open_in_memory().expect("open in-memory knowledge base");
    refresh(&db, dump).expect("sync dump");
    db
}

/// Run one checker over a source/target dump pair, without caching.
pub fn check(checker: &str, source: &ReflectionDump, target: &ReflectionDump) -> Vec<Incident> {
    let source_db = knowledge_base_from(source);
    let target_db = knowledge_base_from(target);
    let registry = default_checker_registry(Arc::new(NoopCache)).expect("build checker registry");
    detect_breaks(&registry, &[checker.to_string()], &source_db, &target_db)
        .expect("detect breaks")
}

/// Wire tags of the produced incidents, in production order.
pub fn tags(incidents: &[Incident]) -> Vec<&'static str> {
    incidents
        .iter()
        .map(|incident| incident.incident_type.as_str())
        .collect()
}

/// Elements of the produced incidents, in production order.
pub fn elements(incidents: &[Incident]) -> Vec<&str> {
    incidents
        .iter()
        .map(|incident| incident.element.as_str())
        .collect()
}
