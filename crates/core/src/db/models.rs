use serde::{Deserialize, Serialize};

/// Visibility level of a class member or method.
///
/// Declaration order doubles as the "wider than" ordering: a scope reduction
/// means the source scope compares greater than the target scope. The stored
/// ordinals (1/2/3) are part of the knowledge-base format and do not move
/// with enum reordering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Private,
    Protected,
    Public,
}

impl Scope {
    /// Encode as the ordinal stored in SQLite.
    pub fn ordinal(self) -> i64 {
        match self {
            Scope::Private => 1,
            Scope::Protected => 2,
            Scope::Public => 3,
        }
    }

    /// Decode a stored ordinal; anything outside 1..=3 is corrupt data.
    pub fn from_ordinal(value: i64) -> Option<Self> {
        match value {
            1 => Some(Scope::Private),
            2 => Some(Scope::Protected),
            3 => Some(Scope::Public),
            _ => None,
        }
    }

    /// Lower-case name used in incident old/new values.
    pub fn name(self) -> &'static str {
        match self {
            Scope::Private => "private",
            Scope::Protected => "protected",
            Scope::Public => "public",
        }
    }
}

/// Kind of a class-like entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Class,
    Interface,
    Trait,
}

impl ClassKind {
    pub fn ordinal(self) -> i64 {
        match self {
            ClassKind::Class => 1,
            ClassKind::Interface => 2,
            ClassKind::Trait => 3,
        }
    }

    pub fn from_ordinal(value: i64) -> Option<Self> {
        match value {
            1 => Some(ClassKind::Class),
            2 => Some(ClassKind::Interface),
            3 => Some(ClassKind::Trait),
            _ => None,
        }
    }
}

/// Kind of an inheritance edge between class-like entities.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Extends,
    Implements,
    Uses,
}

impl RelationKind {
    pub fn ordinal(self) -> i64 {
        match self {
            RelationKind::Extends => 1,
            RelationKind::Implements => 2,
            RelationKind::Uses => 3,
        }
    }

    pub fn from_ordinal(value: i64) -> Option<Self> {
        match value {
            1 => Some(RelationKind::Extends),
            2 => Some(RelationKind::Implements),
            3 => Some(RelationKind::Uses),
            _ => None,
        }
    }
}

/// One indexed source file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRecord {
    pub id: i64,
    pub path: String,
    pub size: i64,
    /// Cleared at the start of a refresh; files still unset at the end were
    /// removed from the codebase and are pruned together with their entities.
    pub found: bool,
}

/// A class, interface, or trait as stored in one snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassEntity {
    pub id: i64,
    pub file_id: i64,
    pub name: String,
    pub kind: ClassKind,
    pub is_abstract: bool,
    pub is_final: bool,
}

/// A class-scoped constant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassConstantRecord {
    pub class_id: i64,
    pub name: String,
    /// Opaque serialized literal; checked for presence only.
    pub value: String,
}

/// A class member (field).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PropertyRecord {
    pub class_id: i64,
    pub name: String,
    /// Opaque serialized default value.
    pub value: String,
    pub scope: Scope,
    pub is_static: bool,
}

/// A class method.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MethodRecord {
    pub id: i64,
    pub class_id: i64,
    pub name: String,
    pub scope: Scope,
    pub is_abstract: bool,
    pub is_final: bool,
    pub is_static: bool,
    pub is_variadic: bool,
    pub returns_reference: bool,
    pub has_return_type: bool,
    pub return_type: Option<String>,
    pub parameter_count: i64,
    pub required_parameter_count: i64,
}

/// One parameter of a method or free function.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParameterRecord {
    /// 0-based position; listings come back ordered by it.
    pub position: i64,
    pub name: String,
    pub type_class: Option<String>,
    pub has_type: bool,
    pub type_name: Option<String>,
    pub allows_null: bool,
    pub is_array: bool,
    pub is_callable: bool,
    pub is_optional: bool,
    pub is_variadic: bool,
    pub can_be_passed_by_value: bool,
    pub is_passed_by_reference: bool,
    pub has_default_value: bool,
    /// Serialized (JSON) default literal, when one exists.
    pub default_value: Option<String>,
    /// Symbolic constant name; takes precedence over `default_value` when rendering.
    pub default_constant: Option<String>,
}

/// A free (global) function.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionRecord {
    pub id: i64,
    pub file_id: i64,
    pub name: String,
    pub is_variadic: bool,
    pub returns_reference: bool,
    pub has_return_type: bool,
    pub return_type: Option<String>,
    pub parameter_count: i64,
    pub required_parameter_count: i64,
}

/// A global constant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConstantRecord {
    pub file_id: i64,
    pub name: String,
    pub value: String,
}

/// An unresolved inheritance edge, as collected from the reflection dump and
/// stored on the class row until aggregation resolves ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawRelation {
    pub name: String,
    pub kind: RelationKind,
    /// True for builtin/stdlib relations that can never resolve to an id.
    #[serde(default)]
    pub is_internal: bool,
}

impl RawRelation {
    pub fn new(name: impl Into<String>, kind: RelationKind) -> Self {
        Self { name: name.into(), kind, is_internal: false }
    }

    /// Builder-style helper marking the edge as builtin/external.
    pub fn internal(mut self) -> Self {
        self.is_internal = true;
        self
    }
}

/// A resolved inheritance edge.
///
/// `related_id` is 0 when the related entity is external/builtin; such edges
/// contribute nothing to recursive lookups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelationRecord {
    pub class_id: i64,
    pub related_class: String,
    pub related_id: i64,
    pub kind: RelationKind,
}

/// One recorded knowledge-base refresh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncRunRecord {
    /// RFC 3339 timestamps.
    pub started_at: String,
    pub finished_at: String,
    pub files_seen: i64,
    pub files_changed: i64,
    pub files_removed: i64,
}

/// One name/count pair of the knowledge-base statistics report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatisticEntry {
    pub name: String,
    pub count: i64,
}

impl StatisticEntry {
    pub fn new(name: impl Into<String>, count: i64) -> Self {
        Self { name: name.into(), count }
    }
}
