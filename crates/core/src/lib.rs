//! code-insight-core
//!
//! Core library for indexing PHP codebases into SQLite knowledge bases and
//! detecting backwards-compatibility breaks between two of them.
//!
//! This crate defines the knowledge-base storage layer (db), the reflection
//! dump ingestion pipeline (sync), the compatibility checkers (bc), and the
//! report renderers (report).
//!
//! The goal is to keep all substantive logic here so it is fully testable and
//! reusable from multiple frontends (CLI, CI integrations, etc.).

pub mod bc;
pub mod db;
pub mod report;
pub mod sync;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
