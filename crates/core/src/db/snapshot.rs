use crate::db::knowledge_base::{DbResult, KnowledgeBaseDb};
use crate::db::models::{
    ClassConstantRecord, ClassEntity, FunctionRecord, MethodRecord, ParameterRecord,
    PropertyRecord, RelationRecord, Scope,
};

/// Identifies which table a parameter list hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterOwner {
    Method(i64),
    Function(i64),
}

/// Read-only view of one indexed codebase snapshot.
///
/// The compatibility checkers work exclusively through this trait, so tests
/// and alternative storage backends can stand in for the SQLite store.
/// Implementations are not required to be `Sync`; checker runs hold each
/// snapshot from a single thread.
pub trait Snapshot {
    /// Stable identity of the snapshot, used to namespace cache keys.
    fn identity(&self) -> &str;

    /// Every class-like entity (classes, interfaces, traits), in stored
    /// order. This order drives the order incidents are produced in.
    fn class_like_entities(&self) -> DbResult<Vec<ClassEntity>>;

    /// Constants declared directly on the class.
    fn class_constants(&self, class_id: i64) -> DbResult<Vec<ClassConstantRecord>>;

    /// Properties declared directly on the class; `scopes` narrows the
    /// result when given.
    fn class_members(
        &self,
        class_id: i64,
        scopes: Option<&[Scope]>,
    ) -> DbResult<Vec<PropertyRecord>>;

    /// Methods declared directly on the class; `scopes` narrows the result
    /// when given.
    fn class_methods(
        &self,
        class_id: i64,
        scopes: Option<&[Scope]>,
    ) -> DbResult<Vec<MethodRecord>>;

    /// Resolved inheritance edges of the class.
    fn class_relations(&self, class_id: i64) -> DbResult<Vec<RelationRecord>>;

    /// Parameter list of a method or free function, in declaration order.
    fn parameters(&self, owner: ParameterOwner) -> DbResult<Vec<ParameterRecord>>;

    /// Every free function, in stored order.
    fn functions(&self) -> DbResult<Vec<FunctionRecord>>;

    /// Names of all global constants.
    fn constant_names(&self) -> DbResult<Vec<String>>;
}

impl Snapshot for KnowledgeBaseDb {
    fn identity(&self) -> &str {
        KnowledgeBaseDb::identity(self)
    }

    fn class_like_entities(&self) -> DbResult<Vec<ClassEntity>> {
        self.list_classes()
    }

    fn class_constants(&self, class_id: i64) -> DbResult<Vec<ClassConstantRecord>> {
        self.list_class_constants(class_id)
    }

    fn class_members(
        &self,
        class_id: i64,
        scopes: Option<&[Scope]>,
    ) -> DbResult<Vec<PropertyRecord>> {
        self.list_class_properties(class_id, scopes)
    }

    fn class_methods(
        &self,
        class_id: i64,
        scopes: Option<&[Scope]>,
    ) -> DbResult<Vec<MethodRecord>> {
        self.list_class_methods(class_id, scopes)
    }

    fn class_relations(&self, class_id: i64) -> DbResult<Vec<RelationRecord>> {
        self.list_class_relations(class_id)
    }

    fn parameters(&self, owner: ParameterOwner) -> DbResult<Vec<ParameterRecord>> {
        match owner {
            ParameterOwner::Method(id) => self.list_method_parameters(id),
            ParameterOwner::Function(id) => self.list_function_parameters(id),
        }
    }

    fn functions(&self) -> DbResult<Vec<FunctionRecord>> {
        self.list_functions()
    }

    fn constant_names(&self) -> DbResult<Vec<String>> {
        KnowledgeBaseDb::constant_names(self)
    }
}
