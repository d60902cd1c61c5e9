use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ValueRef};
use rusqlite::{params, Connection};
use thiserror::Error;

use crate::db::models::{
    ClassConstantRecord, ClassEntity, ClassKind, ConstantRecord, FileRecord, FunctionRecord,
    MethodRecord, ParameterRecord, PropertyRecord, RawRelation, RelationKind, RelationRecord,
    Scope, StatisticEntry, SyncRunRecord,
};

/// Minimum schema version we know how to handle.
///
/// `0` means "no schema yet" (fresh DB).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Error type for knowledge-base operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Underlying SQLite error.
    ///
    /// Corrupt scope/kind ordinals surface here as column conversion
    /// failures rather than being silently misclassified.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// The database was created with a newer schema version than we support.
    #[error(
        "Unsupported schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },

    /// A stored raw-relation payload could not be decoded.
    #[error("Malformed relation payload: {0}")]
    MalformedRelations(#[from] serde_json::Error),
}

/// Convenience result type for knowledge-base operations.
pub type DbResult<T> = Result<T, DbError>;

impl FromSql for Scope {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = i64::column_result(value)?;
        Scope::from_ordinal(raw).ok_or(FromSqlError::OutOfRange(raw))
    }
}

impl FromSql for ClassKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = i64::column_result(value)?;
        ClassKind::from_ordinal(raw).ok_or(FromSqlError::OutOfRange(raw))
    }
}

impl FromSql for RelationKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = i64::column_result(value)?;
        RelationKind::from_ordinal(raw).ok_or(FromSqlError::OutOfRange(raw))
    }
}

static MEMORY_DB_SEQ: AtomicU64 = AtomicU64::new(0);

/// SQLite-backed knowledge base holding one indexed snapshot of a codebase.
///
/// This is a thin wrapper around `rusqlite::Connection` that is responsible
/// for:
/// - Opening/creating the DB file.
/// - Applying schema migrations.
/// - Providing typed read queries (the snapshot side) and the write surface
///   used by the sync layer.
#[derive(Debug)]
pub struct KnowledgeBaseDb {
    conn: Connection,
    identity: String,
}

impl KnowledgeBaseDb {
    /// Open (or create) a knowledge base at the given path and ensure the
    /// schema exists.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        apply_migrations(&conn)?;
        Ok(Self { conn, identity: path.display().to_string() })
    }

    /// Open a throwaway in-memory knowledge base (used heavily by tests).
    ///
    /// Each call gets a distinct identity so cache entries from different
    /// in-memory snapshots can never collide.
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        apply_migrations(&conn)?;
        let seq = MEMORY_DB_SEQ.fetch_add(1, Ordering::Relaxed);
        Ok(Self { conn, identity: format!("memory:{seq}") })
    }

    /// Stable identity of this snapshot (the database path). Cache keys are
    /// derived from it.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Expose a reference to the underlying connection for advanced callers.
    /// For most code, prefer higher-level helpers.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ---- read queries -----------------------------------------------------

    /// List all class-like entities (ordered by id).
    pub fn list_classes(&self) -> DbResult<Vec<ClassEntity>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT Id, FileId, Name, ClassType, IsAbstract, IsFinal
            FROM Classes
            ORDER BY Id
            "#,
        )?;
        let rows = stmt.query_map([], map_class_row)?;
        collect_rows(rows)
    }

    /// Find a class-like entity by exact name.
    pub fn class_by_name(&self, name: &str) -> DbResult<Option<ClassEntity>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT Id, FileId, Name, ClassType, IsAbstract, IsFinal
            FROM Classes
            WHERE Name = ?1
            ORDER BY Id
            LIMIT 1
            "#,
        )?;
        let mut rows = stmt.query_map(params![name], map_class_row)?;
        rows.next().transpose().map_err(DbError::from)
    }

    /// Constants declared directly on a class (insertion order).
    pub fn list_class_constants(&self, class_id: i64) -> DbResult<Vec<ClassConstantRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT ClassId, Name, Value
            FROM ClassConstants
            WHERE ClassId = ?1
            ORDER BY rowid
            "#,
        )?;
        let rows = stmt.query_map(params![class_id], |row| {
            Ok(ClassConstantRecord { class_id: row.get(0)?, name: row.get(1)?, value: row.get(2)? })
        })?;
        collect_rows(rows)
    }

    /// Members declared directly on a class, optionally narrowed to a scope
    /// set (insertion order).
    pub fn list_class_properties(
        &self,
        class_id: i64,
        scopes: Option<&[Scope]>,
    ) -> DbResult<Vec<PropertyRecord>> {
        let sql = format!(
            r#"
            SELECT ClassId, Name, Value, Scope, IsStatic
            FROM ClassProperties
            WHERE ClassId = ?1{}
            ORDER BY rowid
            "#,
            scope_filter_sql(scopes)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![class_id], |row| {
            Ok(PropertyRecord {
                class_id: row.get(0)?,
                name: row.get(1)?,
                value: row.get(2)?,
                scope: row.get(3)?,
                is_static: row.get(4)?,
            })
        })?;
        collect_rows(rows)
    }

    /// Methods declared directly on a class, optionally narrowed to a scope
    /// set (insertion order).
    pub fn list_class_methods(
        &self,
        class_id: i64,
        scopes: Option<&[Scope]>,
    ) -> DbResult<Vec<MethodRecord>> {
        let sql = format!(
            r#"
            SELECT Id, ClassId, Name, Scope, IsAbstract, IsFinal, IsStatic, IsVariadic,
                   ReturnsReference, HasReturnType, ReturnType, ParameterCount,
                   RequiredParameterCount
            FROM ClassMethods
            WHERE ClassId = ?1{}
            ORDER BY Id
            "#,
            scope_filter_sql(scopes)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![class_id], |row| {
            Ok(MethodRecord {
                id: row.get(0)?,
                class_id: row.get(1)?,
                name: row.get(2)?,
                scope: row.get(3)?,
                is_abstract: row.get(4)?,
                is_final: row.get(5)?,
                is_static: row.get(6)?,
                is_variadic: row.get(7)?,
                returns_reference: row.get(8)?,
                has_return_type: row.get(9)?,
                return_type: row.get(10)?,
                parameter_count: row.get(11)?,
                required_parameter_count: row.get(12)?,
            })
        })?;
        collect_rows(rows)
    }

    /// Resolved inheritance edges of a class (insertion order).
    pub fn list_class_relations(&self, class_id: i64) -> DbResult<Vec<RelationRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT ClassId, RelatedClass, RelatedClassId, RelationType
            FROM ClassRelations
            WHERE ClassId = ?1
            ORDER BY rowid
            "#,
        )?;
        let rows = stmt.query_map(params![class_id], |row| {
            Ok(RelationRecord {
                class_id: row.get(0)?,
                related_class: row.get(1)?,
                related_id: row.get(2)?,
                kind: row.get(3)?,
            })
        })?;
        collect_rows(rows)
    }

    /// Parameters of a method, in position order.
    pub fn list_method_parameters(&self, method_id: i64) -> DbResult<Vec<ParameterRecord>> {
        self.list_parameters("MethodParameters", "MethodId", method_id)
    }

    /// Parameters of a free function, in position order.
    pub fn list_function_parameters(&self, function_id: i64) -> DbResult<Vec<ParameterRecord>> {
        self.list_parameters("FunctionParameters", "FunctionId", function_id)
    }

    fn list_parameters(
        &self,
        table: &str,
        owner_column: &str,
        owner_id: i64,
    ) -> DbResult<Vec<ParameterRecord>> {
        let sql = format!(
            r#"
            SELECT Position, Name, TypeClass, HasType, TypeName, AllowsNull, IsArray,
                   IsCallable, IsOptional, IsVariadic, CanBePassedByValue,
                   IsPassedByReference, HasDefaultValue, DefaultValue, DefaultConstant
            FROM {table}
            WHERE {owner_column} = ?1
            ORDER BY Position
            "#
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![owner_id], |row| {
            Ok(ParameterRecord {
                position: row.get(0)?,
                name: row.get(1)?,
                type_class: row.get(2)?,
                has_type: row.get(3)?,
                type_name: row.get(4)?,
                allows_null: row.get(5)?,
                is_array: row.get(6)?,
                is_callable: row.get(7)?,
                is_optional: row.get(8)?,
                is_variadic: row.get(9)?,
                can_be_passed_by_value: row.get(10)?,
                is_passed_by_reference: row.get(11)?,
                has_default_value: row.get(12)?,
                default_value: row.get(13)?,
                default_constant: row.get(14)?,
            })
        })?;
        collect_rows(rows)
    }

    /// List all free functions (ordered by id).
    pub fn list_functions(&self) -> DbResult<Vec<FunctionRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT Id, FileId, Name, IsVariadic, ReturnsReference, HasReturnType, ReturnType,
                   ParameterCount, RequiredParameterCount
            FROM Functions
            ORDER BY Id
            "#,
        )?;
        let rows = stmt.query_map([], map_function_row)?;
        collect_rows(rows)
    }

    /// Find a free function by exact name.
    pub fn function_by_name(&self, name: &str) -> DbResult<Option<FunctionRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT Id, FileId, Name, IsVariadic, ReturnsReference, HasReturnType, ReturnType,
                   ParameterCount, RequiredParameterCount
            FROM Functions
            WHERE Name = ?1
            ORDER BY Id
            LIMIT 1
            "#,
        )?;
        let mut rows = stmt.query_map(params![name], map_function_row)?;
        rows.next().transpose().map_err(DbError::from)
    }

    /// List all global constants (insertion order).
    pub fn list_constants(&self) -> DbResult<Vec<ConstantRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT FileId, Name, Value
            FROM Constants
            ORDER BY rowid
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ConstantRecord { file_id: row.get(0)?, name: row.get(1)?, value: row.get(2)? })
        })?;
        collect_rows(rows)
    }

    /// Names of all global constants (insertion order).
    pub fn constant_names(&self) -> DbResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT Name FROM Constants ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        collect_rows(rows)
    }

    /// List all indexed files (ordered by id).
    pub fn list_files(&self) -> DbResult<Vec<FileRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT Id, Path, Size, Found
            FROM Files
            ORDER BY Id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(FileRecord {
                id: row.get(0)?,
                path: row.get(1)?,
                size: row.get(2)?,
                found: row.get(3)?,
            })
        })?;
        collect_rows(rows)
    }

    /// Row counts per entity table, in report order.
    pub fn statistics(&self) -> DbResult<Vec<StatisticEntry>> {
        let tables = [
            ("Files", "Files"),
            ("Classes", "Classes"),
            ("Class Constants", "ClassConstants"),
            ("Class Properties", "ClassProperties"),
            ("Class Methods", "ClassMethods"),
            ("Method Parameters", "MethodParameters"),
            ("Class Relations", "ClassRelations"),
            ("Functions", "Functions"),
            ("Function Parameters", "FunctionParameters"),
            ("Constants", "Constants"),
        ];
        let mut entries = Vec::with_capacity(tables.len());
        for (label, table) in tables {
            let sql = format!("SELECT COUNT(*) FROM {table}");
            let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
            entries.push(StatisticEntry::new(label, count));
        }
        Ok(entries)
    }

    // ---- write surface (sync layer) ---------------------------------------

    /// Clear the found flag on every file; refresh marks survivors back.
    pub fn mark_all_files_missing(&self) -> DbResult<()> {
        self.conn.execute("UPDATE Files SET Found = 0", [])?;
        Ok(())
    }

    /// Look up a file row by path.
    pub fn file_by_path(&self, path: &str) -> DbResult<Option<FileRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT Id, Path, Size, Found
            FROM Files
            WHERE Path = ?1
            "#,
        )?;
        let mut rows = stmt.query_map(params![path], |row| {
            Ok(FileRecord {
                id: row.get(0)?,
                path: row.get(1)?,
                size: row.get(2)?,
                found: row.get(3)?,
            })
        })?;
        rows.next().transpose().map_err(DbError::from)
    }

    /// Insert a new file row (marked found) and return its id.
    pub fn insert_file(&self, path: &str, size: i64) -> DbResult<i64> {
        self.conn.execute(
            "INSERT INTO Files (Path, Size, Found) VALUES (?1, ?2, 1)",
            params![path, size],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Update a file's size and mark it found.
    pub fn touch_file(&self, id: i64, size: i64) -> DbResult<()> {
        self.conn.execute("UPDATE Files SET Size = ?2, Found = 1 WHERE Id = ?1", params![id, size])?;
        Ok(())
    }

    /// Mark an unchanged file as found without touching its entities.
    pub fn mark_file_found(&self, id: i64) -> DbResult<()> {
        self.conn.execute("UPDATE Files SET Found = 1 WHERE Id = ?1", params![id])?;
        Ok(())
    }

    /// Delete every entity collected from one file (classes with their
    /// constants/properties/methods/parameters/relations, functions with
    /// their parameters, constants). The file row itself stays.
    pub fn delete_file_entities(&self, file_id: i64) -> DbResult<()> {
        let statements = [
            "DELETE FROM MethodParameters WHERE MethodId IN \
             (SELECT Id FROM ClassMethods WHERE ClassId IN \
              (SELECT Id FROM Classes WHERE FileId = ?1))",
            "DELETE FROM ClassMethods WHERE ClassId IN \
             (SELECT Id FROM Classes WHERE FileId = ?1)",
            "DELETE FROM ClassProperties WHERE ClassId IN \
             (SELECT Id FROM Classes WHERE FileId = ?1)",
            "DELETE FROM ClassConstants WHERE ClassId IN \
             (SELECT Id FROM Classes WHERE FileId = ?1)",
            "DELETE FROM ClassRelations WHERE ClassId IN \
             (SELECT Id FROM Classes WHERE FileId = ?1)",
            "DELETE FROM Classes WHERE FileId = ?1",
            "DELETE FROM FunctionParameters WHERE FunctionId IN \
             (SELECT Id FROM Functions WHERE FileId = ?1)",
            "DELETE FROM Functions WHERE FileId = ?1",
            "DELETE FROM Constants WHERE FileId = ?1",
        ];
        for sql in statements {
            self.conn.execute(sql, params![file_id])?;
        }
        Ok(())
    }

    /// Drop files still flagged missing after a refresh, with their entities.
    /// Returns how many files were pruned.
    pub fn prune_missing_files(&self) -> DbResult<usize> {
        let mut stmt = self.conn.prepare("SELECT Id FROM Files WHERE Found = 0")?;
        let ids = stmt.query_map([], |row| row.get::<_, i64>(0))?;
        let missing = collect_rows(ids)?;
        for id in &missing {
            self.delete_file_entities(*id)?;
        }
        self.conn.execute("DELETE FROM Files WHERE Found = 0", [])?;
        Ok(missing.len())
    }

    /// Insert a class row; `raw_relations` is the serialized unresolved edge
    /// list consumed later by [`KnowledgeBaseDb::rebuild_class_relations`].
    pub fn insert_class(
        &self,
        file_id: i64,
        name: &str,
        kind: ClassKind,
        is_abstract: bool,
        is_final: bool,
        raw_relations: &str,
    ) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO Classes (FileId, Name, ClassType, IsAbstract, IsFinal, RawRelations)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![file_id, name, kind.ordinal(), is_abstract, is_final, raw_relations],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_class_constant(&self, class_id: i64, name: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO ClassConstants (ClassId, Name, Value) VALUES (?1, ?2, ?3)",
            params![class_id, name, value],
        )?;
        Ok(())
    }

    pub fn insert_class_property(&self, record: &PropertyRecord) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO ClassProperties (ClassId, Name, Value, Scope, IsStatic)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                record.class_id,
                record.name,
                record.value,
                record.scope.ordinal(),
                record.is_static
            ],
        )?;
        Ok(())
    }

    /// Insert a method row (the record's `id` field is ignored) and return
    /// the new id.
    pub fn insert_class_method(&self, record: &MethodRecord) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO ClassMethods (ClassId, Name, Scope, IsAbstract, IsFinal, IsStatic,
                                      IsVariadic, ReturnsReference, HasReturnType, ReturnType,
                                      ParameterCount, RequiredParameterCount)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                record.class_id,
                record.name,
                record.scope.ordinal(),
                record.is_abstract,
                record.is_final,
                record.is_static,
                record.is_variadic,
                record.returns_reference,
                record.has_return_type,
                record.return_type,
                record.parameter_count,
                record.required_parameter_count,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_method_parameter(
        &self,
        method_id: i64,
        record: &ParameterRecord,
    ) -> DbResult<()> {
        self.insert_parameter("MethodParameters", "MethodId", method_id, record)
    }

    /// Insert a function row (the record's `id` field is ignored) and return
    /// the new id.
    pub fn insert_function(&self, record: &FunctionRecord) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO Functions (FileId, Name, IsVariadic, ReturnsReference, HasReturnType,
                                   ReturnType, ParameterCount, RequiredParameterCount)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                record.file_id,
                record.name,
                record.is_variadic,
                record.returns_reference,
                record.has_return_type,
                record.return_type,
                record.parameter_count,
                record.required_parameter_count,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_function_parameter(
        &self,
        function_id: i64,
        record: &ParameterRecord,
    ) -> DbResult<()> {
        self.insert_parameter("FunctionParameters", "FunctionId", function_id, record)
    }

    fn insert_parameter(
        &self,
        table: &str,
        owner_column: &str,
        owner_id: i64,
        record: &ParameterRecord,
    ) -> DbResult<()> {
        let sql = format!(
            r#"
            INSERT INTO {table} ({owner_column}, Position, Name, TypeClass, HasType, TypeName,
                                 AllowsNull, IsArray, IsCallable, IsOptional, IsVariadic,
                                 CanBePassedByValue, IsPassedByReference, HasDefaultValue,
                                 DefaultValue, DefaultConstant)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#
        );
        self.conn.execute(
            &sql,
            params![
                owner_id,
                record.position,
                record.name,
                record.type_class,
                record.has_type,
                record.type_name,
                record.allows_null,
                record.is_array,
                record.is_callable,
                record.is_optional,
                record.is_variadic,
                record.can_be_passed_by_value,
                record.is_passed_by_reference,
                record.has_default_value,
                record.default_value,
                record.default_constant,
            ],
        )?;
        Ok(())
    }

    pub fn insert_constant(&self, file_id: i64, name: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO Constants (FileId, Name, Value) VALUES (?1, ?2, ?3)",
            params![file_id, name, value],
        )?;
        Ok(())
    }

    /// Rebuild the resolved `ClassRelations` table from the raw edge lists
    /// stored on every class row. Names that resolve to an indexed class get
    /// its id; internal/unknown names get 0.
    pub fn rebuild_class_relations(&self) -> DbResult<()> {
        let mut stmt = self.conn.prepare("SELECT Id, Name, RawRelations FROM Classes ORDER BY Id")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
        })?;
        let classes = collect_rows(rows)?;

        let mut ids_by_name: HashMap<&str, i64> = HashMap::new();
        for (id, name, _) in &classes {
            ids_by_name.entry(name.as_str()).or_insert(*id);
        }

        self.conn.execute("DELETE FROM ClassRelations", [])?;
        let mut insert = self.conn.prepare(
            r#"
            INSERT INTO ClassRelations (ClassId, RelatedClass, RelatedClassId, RelationType)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )?;
        for (class_id, _, raw) in &classes {
            if raw.is_empty() {
                continue;
            }
            let relations: Vec<RawRelation> = serde_json::from_str(raw)?;
            for relation in relations {
                let related_id = if relation.is_internal {
                    0
                } else {
                    ids_by_name.get(relation.name.as_str()).copied().unwrap_or(0)
                };
                insert.execute(params![
                    class_id,
                    relation.name,
                    related_id,
                    relation.kind.ordinal()
                ])?;
            }
        }
        Ok(())
    }

    /// Record one refresh and return its row id.
    pub fn insert_sync_run(&self, record: &SyncRunRecord) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO SyncRuns (StartedAt, FinishedAt, FilesSeen, FilesChanged, FilesRemoved)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                record.started_at,
                record.finished_at,
                record.files_seen,
                record.files_changed,
                record.files_removed,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent refresh, if any.
    pub fn latest_sync_run(&self) -> DbResult<Option<SyncRunRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT StartedAt, FinishedAt, FilesSeen, FilesChanged, FilesRemoved
            FROM SyncRuns
            ORDER BY Id DESC
            LIMIT 1
            "#,
        )?;
        let mut rows = stmt.query_map([], |row| {
            Ok(SyncRunRecord {
                started_at: row.get(0)?,
                finished_at: row.get(1)?,
                files_seen: row.get(2)?,
                files_changed: row.get(3)?,
                files_removed: row.get(4)?,
            })
        })?;
        rows.next().transpose().map_err(DbError::from)
    }
}

fn map_class_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ClassEntity> {
    Ok(ClassEntity {
        id: row.get(0)?,
        file_id: row.get(1)?,
        name: row.get(2)?,
        kind: row.get(3)?,
        is_abstract: row.get(4)?,
        is_final: row.get(5)?,
    })
}

fn map_function_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FunctionRecord> {
    Ok(FunctionRecord {
        id: row.get(0)?,
        file_id: row.get(1)?,
        name: row.get(2)?,
        is_variadic: row.get(3)?,
        returns_reference: row.get(4)?,
        has_return_type: row.get(5)?,
        return_type: row.get(6)?,
        parameter_count: row.get(7)?,
        required_parameter_count: row.get(8)?,
    })
}

fn collect_rows<T, I>(rows: I) -> DbResult<Vec<T>>
where
    I: Iterator<Item = rusqlite::Result<T>>,
{
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn scope_filter_sql(scopes: Option<&[Scope]>) -> String {
    match scopes {
        None => String::new(),
        Some(scopes) => {
            let ordinals: Vec<String> =
                scopes.iter().map(|scope| scope.ordinal().to_string()).collect();
            format!(" AND Scope IN ({})", ordinals.join(", "))
        }
    }
}

/// Read the current schema version from `PRAGMA user_version`.
fn current_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}

/// Apply schema migrations step by step until the DB is at
/// [`CURRENT_SCHEMA_VERSION`].
fn apply_migrations(conn: &Connection) -> DbResult<()> {
    let mut current_version = current_schema_version(conn)?;

    // Reject DBs created with a newer schema than we support.
    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current_version == 0 {
        // Initial schema: one snapshot of a codebase's structural elements.
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS Files (
                Id    INTEGER PRIMARY KEY AUTOINCREMENT,
                Path  TEXT NOT NULL UNIQUE,
                Size  INTEGER NOT NULL,
                Found INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS Classes (
                Id           INTEGER PRIMARY KEY AUTOINCREMENT,
                FileId       INTEGER NOT NULL,
                Name         TEXT NOT NULL,
                ClassType    INTEGER NOT NULL,
                IsAbstract   INTEGER NOT NULL DEFAULT 0,
                IsFinal      INTEGER NOT NULL DEFAULT 0,
                RawRelations TEXT NOT NULL DEFAULT ''
            );
            CREATE INDEX IF NOT EXISTS IDX_Classes_Name ON Classes (Name);

            CREATE TABLE IF NOT EXISTS ClassConstants (
                ClassId INTEGER NOT NULL,
                Name    TEXT NOT NULL,
                Value   TEXT NOT NULL,
                PRIMARY KEY (ClassId, Name)
            );

            CREATE TABLE IF NOT EXISTS ClassProperties (
                ClassId  INTEGER NOT NULL,
                Name     TEXT NOT NULL,
                Value    TEXT NOT NULL,
                Scope    INTEGER NOT NULL,
                IsStatic INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (ClassId, Name)
            );

            CREATE TABLE IF NOT EXISTS ClassMethods (
                Id                     INTEGER PRIMARY KEY AUTOINCREMENT,
                ClassId                INTEGER NOT NULL,
                Name                   TEXT NOT NULL,
                Scope                  INTEGER NOT NULL,
                IsAbstract             INTEGER NOT NULL DEFAULT 0,
                IsFinal                INTEGER NOT NULL DEFAULT 0,
                IsStatic               INTEGER NOT NULL DEFAULT 0,
                IsVariadic             INTEGER NOT NULL DEFAULT 0,
                ReturnsReference       INTEGER NOT NULL DEFAULT 0,
                HasReturnType          INTEGER NOT NULL DEFAULT 0,
                ReturnType             TEXT,
                ParameterCount         INTEGER NOT NULL DEFAULT 0,
                RequiredParameterCount INTEGER NOT NULL DEFAULT 0
            );
            CREATE INDEX IF NOT EXISTS IDX_ClassMethods_ClassId ON ClassMethods (ClassId);

            CREATE TABLE IF NOT EXISTS MethodParameters (
                MethodId            INTEGER NOT NULL,
                Position            INTEGER NOT NULL,
                Name                TEXT NOT NULL,
                TypeClass           TEXT,
                HasType             INTEGER NOT NULL DEFAULT 0,
                TypeName            TEXT,
                AllowsNull          INTEGER NOT NULL DEFAULT 0,
                IsArray             INTEGER NOT NULL DEFAULT 0,
                IsCallable          INTEGER NOT NULL DEFAULT 0,
                IsOptional          INTEGER NOT NULL DEFAULT 0,
                IsVariadic          INTEGER NOT NULL DEFAULT 0,
                CanBePassedByValue  INTEGER NOT NULL DEFAULT 1,
                IsPassedByReference INTEGER NOT NULL DEFAULT 0,
                HasDefaultValue     INTEGER NOT NULL DEFAULT 0,
                DefaultValue        TEXT,
                DefaultConstant     TEXT,
                PRIMARY KEY (MethodId, Position)
            );

            CREATE TABLE IF NOT EXISTS ClassRelations (
                ClassId        INTEGER NOT NULL,
                RelatedClass   TEXT NOT NULL,
                RelatedClassId INTEGER NOT NULL DEFAULT 0,
                RelationType   INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS IDX_ClassRelations_ClassId ON ClassRelations (ClassId);

            CREATE TABLE IF NOT EXISTS Functions (
                Id                     INTEGER PRIMARY KEY AUTOINCREMENT,
                FileId                 INTEGER NOT NULL,
                Name                   TEXT NOT NULL,
                IsVariadic             INTEGER NOT NULL DEFAULT 0,
                ReturnsReference       INTEGER NOT NULL DEFAULT 0,
                HasReturnType          INTEGER NOT NULL DEFAULT 0,
                ReturnType             TEXT,
                ParameterCount         INTEGER NOT NULL DEFAULT 0,
                RequiredParameterCount INTEGER NOT NULL DEFAULT 0
            );
            CREATE INDEX IF NOT EXISTS IDX_Functions_Name ON Functions (Name);

            CREATE TABLE IF NOT EXISTS FunctionParameters (
                FunctionId          INTEGER NOT NULL,
                Position            INTEGER NOT NULL,
                Name                TEXT NOT NULL,
                TypeClass           TEXT,
                HasType             INTEGER NOT NULL DEFAULT 0,
                TypeName            TEXT,
                AllowsNull          INTEGER NOT NULL DEFAULT 0,
                IsArray             INTEGER NOT NULL DEFAULT 0,
                IsCallable          INTEGER NOT NULL DEFAULT 0,
                IsOptional          INTEGER NOT NULL DEFAULT 0,
                IsVariadic          INTEGER NOT NULL DEFAULT 0,
                CanBePassedByValue  INTEGER NOT NULL DEFAULT 1,
                IsPassedByReference INTEGER NOT NULL DEFAULT 0,
                HasDefaultValue     INTEGER NOT NULL DEFAULT 0,
                DefaultValue        TEXT,
                DefaultConstant     TEXT,
                PRIMARY KEY (FunctionId, Position)
            );

            CREATE TABLE IF NOT EXISTS Constants (
                FileId INTEGER NOT NULL,
                Name   TEXT NOT NULL,
                Value  TEXT NOT NULL,
                PRIMARY KEY (FileId, Name)
            );

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
        current_version = 1;
    }

    if current_version < 2 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS SyncRuns (
                Id           INTEGER PRIMARY KEY AUTOINCREMENT,
                StartedAt    TEXT NOT NULL,
                FinishedAt   TEXT NOT NULL,
                FilesSeen    INTEGER NOT NULL DEFAULT 0,
                FilesChanged INTEGER NOT NULL DEFAULT 0,
                FilesRemoved INTEGER NOT NULL DEFAULT 0
            );

            PRAGMA user_version = 2;
            COMMIT;
            "#,
        )?;
    }

    Ok(())
}
