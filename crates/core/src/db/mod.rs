//! Knowledge base storage and project layout definitions.
//!
//! This module wraps the SQLite databases storing indexed codebase
//! snapshots:
//! - Files and the class-likes, functions and constants collected from them
//! - Class constants, properties, methods and their parameters
//! - Resolved inheritance edges between class-likes
//! - Sync run histories
//!
//! The pieces:
//! - `ProjectConfig`: serializable per-project settings (`.code-insight.json`).
//! - `DatabaseLayout`: computed paths for the working directory, per-project
//!   database folder and forks.
//! - `KnowledgeBaseDb`: a small SQLite wrapper with schema migrations and the
//!   typed read/write surface.
//! - `Snapshot`: the read-only view compatibility checkers consume.
//! - Record types (`ClassEntity`, `MethodRecord`, etc.) mirroring what lives
//!   in the knowledge base.

mod config;
mod context;
mod knowledge_base;
mod layout;
mod models;
mod snapshot;
mod util;

pub use config::{ProjectConfig, PROJECT_CONFIG_FILE};
pub use context::ProjectContext;
pub use knowledge_base::{DbError, DbResult, KnowledgeBaseDb, CURRENT_SCHEMA_VERSION};
pub use layout::{default_working_dir, DatabaseLayout, DB_FILE_NAME, WORKING_DIR_ENV};
pub use models::{
    ClassConstantRecord, ClassEntity, ClassKind, ConstantRecord, FileRecord, FunctionRecord,
    MethodRecord, ParameterRecord, PropertyRecord, RawRelation, RelationKind, RelationRecord,
    Scope, StatisticEntry, SyncRunRecord,
};
pub use snapshot::{ParameterOwner, Snapshot};
pub use util::{
    knowledge_base_path, list_forks, load_project_config, open_existing_knowledge_base,
    open_fork_knowledge_base, open_knowledge_base, save_project_config,
};
