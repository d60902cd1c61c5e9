//! Knowledge base synchronization.
//!
//! `sync` ingests a reflection dump (the JSON the indexer produces for one
//! codebase) into the project's knowledge base. Files whose size is
//! unchanged keep their collected entities; everything else is dropped and
//! re-collected. Files missing from the dump are pruned, then inheritance
//! edges are re-resolved across the whole base.

mod dump;

pub use dump::{
    DumpClass, DumpClassConstant, DumpConstant, DumpFile, DumpFunction, DumpMethod, DumpParameter,
    DumpProperty, ReflectionDump,
};

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use thiserror::Error;

use crate::db::{
    DbError, FunctionRecord, KnowledgeBaseDb, MethodRecord, ParameterRecord, PropertyRecord,
    SyncRunRecord,
};

/// Error type for knowledge base refreshes.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error("Failed to serialize relations: {0}")]
    Relations(#[from] serde_json::Error),
}

/// What one refresh did, for reporting back to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSummary {
    /// Files present in the dump.
    pub files_seen: usize,
    /// Files whose entities were (re-)collected.
    pub files_changed: usize,
    /// Files dropped because the dump no longer mentions them.
    pub files_removed: usize,
}

/// Read and parse a reflection dump from disk.
pub fn read_dump_file(path: &Path) -> Result<ReflectionDump> {
    let dump_json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read reflection dump at {}", path.display()))?;
    let dump: ReflectionDump =
        serde_json::from_str(&dump_json).context("Failed to parse reflection dump JSON")?;
    Ok(dump)
}

/// Bring the knowledge base in line with a reflection dump.
pub fn refresh(db: &KnowledgeBaseDb, dump: &ReflectionDump) -> Result<SyncSummary, SyncError> {
    let started_at = Utc::now().to_rfc3339();
    let mut files_changed = 0usize;

    db.mark_all_files_missing()?;

    for file in &dump.files {
        match db.file_by_path(&file.path)? {
            Some(existing) if existing.size == file.size => {
                // Unchanged; keep its entities as they are.
                db.mark_file_found(existing.id)?;
            }
            Some(existing) => {
                db.touch_file(existing.id, file.size)?;
                db.delete_file_entities(existing.id)?;
                collect_file(db, existing.id, file)?;
                files_changed += 1;
            }
            None => {
                let file_id = db.insert_file(&file.path, file.size)?;
                collect_file(db, file_id, file)?;
                files_changed += 1;
            }
        }
    }

    let files_removed = db.prune_missing_files()?;

    // Relation targets may live in other files, so edges can only be
    // resolved once every file has been collected.
    db.rebuild_class_relations()?;

    db.insert_sync_run(&SyncRunRecord {
        started_at,
        finished_at: Utc::now().to_rfc3339(),
        files_seen: dump.files.len() as i64,
        files_changed: files_changed as i64,
        files_removed: files_removed as i64,
    })?;

    Ok(SyncSummary { files_seen: dump.files.len(), files_changed, files_removed })
}

fn collect_file(db: &KnowledgeBaseDb, file_id: i64, file: &DumpFile) -> Result<(), SyncError> {
    for class in &file.classes {
        let raw_relations =
            if class.relations.is_empty() { String::new() } else { serde_json::to_string(&class.relations)? };
        let class_id = db.insert_class(
            file_id,
            &class.name,
            class.kind,
            class.is_abstract,
            class.is_final,
            &raw_relations,
        )?;

        for constant in &class.constants {
            db.insert_class_constant(class_id, &constant.name, &constant.value)?;
        }
        for property in &class.properties {
            db.insert_class_property(&PropertyRecord {
                class_id,
                name: property.name.clone(),
                value: property.value.clone(),
                scope: property.scope,
                is_static: property.is_static,
            })?;
        }
        for method in &class.methods {
            let method_id = db.insert_class_method(&to_method_record(class_id, method))?;
            for (position, parameter) in method.parameters.iter().enumerate() {
                db.insert_method_parameter(
                    method_id,
                    &to_parameter_record(position as i64, parameter),
                )?;
            }
        }
    }

    for function in &file.functions {
        let function_id = db.insert_function(&to_function_record(file_id, function))?;
        for (position, parameter) in function.parameters.iter().enumerate() {
            db.insert_function_parameter(
                function_id,
                &to_parameter_record(position as i64, parameter),
            )?;
        }
    }

    for constant in &file.constants {
        db.insert_constant(file_id, &constant.name, &constant.value)?;
    }

    Ok(())
}

fn to_method_record(class_id: i64, method: &DumpMethod) -> MethodRecord {
    MethodRecord {
        id: 0,
        class_id,
        name: method.name.clone(),
        scope: method.scope,
        is_abstract: method.is_abstract,
        is_final: method.is_final,
        is_static: method.is_static,
        is_variadic: method.is_variadic,
        returns_reference: method.returns_reference,
        has_return_type: method.has_return_type,
        return_type: method.return_type.clone(),
        parameter_count: method.parameters.len() as i64,
        required_parameter_count: required_count(&method.parameters),
    }
}

fn to_function_record(file_id: i64, function: &DumpFunction) -> FunctionRecord {
    FunctionRecord {
        id: 0,
        file_id,
        name: function.name.clone(),
        is_variadic: function.is_variadic,
        returns_reference: function.returns_reference,
        has_return_type: function.has_return_type,
        return_type: function.return_type.clone(),
        parameter_count: function.parameters.len() as i64,
        required_parameter_count: required_count(&function.parameters),
    }
}

fn required_count(parameters: &[DumpParameter]) -> i64 {
    parameters.iter().filter(|p| !p.is_optional && !p.is_variadic).count() as i64
}

fn to_parameter_record(position: i64, parameter: &DumpParameter) -> ParameterRecord {
    ParameterRecord {
        position,
        name: parameter.name.clone(),
        type_class: parameter.type_class.clone(),
        has_type: parameter.has_type,
        type_name: parameter.type_name.clone(),
        allows_null: parameter.allows_null,
        is_array: parameter.is_array,
        is_callable: parameter.is_callable,
        is_optional: parameter.is_optional,
        is_variadic: parameter.is_variadic,
        can_be_passed_by_value: parameter.can_be_passed_by_value,
        is_passed_by_reference: parameter.is_passed_by_reference,
        has_default_value: parameter.has_default_value,
        default_value: parameter
            .has_default_value
            .then(|| parameter.default_value.to_string()),
        default_constant: parameter.default_constant.clone(),
    }
}
