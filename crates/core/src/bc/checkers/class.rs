use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::bc::cache::{class_lookup_key, LookupCache};
use crate::bc::dialect::{DialectPolicy, NullDialect};
use crate::bc::incident::{Incident, IncidentType};
use crate::bc::signature::render_signature;
use crate::bc::{BcError, Checker};
use crate::db::{
    ClassConstantRecord, ClassEntity, DbResult, MethodRecord, ParameterOwner, PropertyRecord,
    RelationRecord, Scope, Snapshot,
};

use super::index_last_wins;

/// How long collected class lookups stay valid in the cache.
const LOOKUP_TTL: Duration = Duration::from_secs(3600);

/// Scopes a caller outside the class hierarchy or a subclass can reach.
const COVERED_SCOPES: [Scope; 2] = [Scope::Public, Scope::Protected];

/// When the class is final on both sides nothing can subclass it, so only
/// public members are part of the contract.
const FINAL_CLASS_SCOPES: [Scope; 1] = [Scope::Public];

/// Detects breaks on classes, interfaces and traits: deletions, abstract and
/// final flags, and per-member checks on constants, properties and methods.
///
/// Member lookups walk the relation graph so that inherited members count as
/// present, while incidents are only raised for members the class declares
/// itself. A [`DialectPolicy`] can canonicalize signatures and waive scope
/// reductions for framework-dispatched methods.
pub struct ClassChecker {
    name: &'static str,
    cache: Arc<dyn LookupCache>,
    dialect: Arc<dyn DialectPolicy>,
}

impl ClassChecker {
    pub fn new(cache: Arc<dyn LookupCache>) -> Self {
        Self {
            name: "class",
            cache,
            dialect: Arc::new(NullDialect),
        }
    }

    pub fn with_dialect(
        name: &'static str,
        cache: Arc<dyn LookupCache>,
        dialect: Arc<dyn DialectPolicy>,
    ) -> Self {
        Self {
            name,
            cache,
            dialect,
        }
    }
}

impl Checker for ClassChecker {
    fn name(&self) -> &str {
        self.name
    }

    fn collect(
        &self,
        source: &dyn Snapshot,
        target: &dyn Snapshot,
    ) -> Result<Vec<Incident>, BcError> {
        let mut run = ClassCheckRun {
            source,
            target,
            cache: self.cache.as_ref(),
            dialect: self.dialect.as_ref(),
            incidents: Vec::new(),
        };
        run.execute()?;
        Ok(run.incidents)
    }
}

/// State for one `collect` call. Keeping it per-run means a checker instance
/// never carries incidents or lookups over from a previous comparison.
struct ClassCheckRun<'a> {
    source: &'a dyn Snapshot,
    target: &'a dyn Snapshot,
    cache: &'a dyn LookupCache,
    dialect: &'a dyn DialectPolicy,
    incidents: Vec<Incident>,
}

impl ClassCheckRun<'_> {
    fn execute(&mut self) -> Result<(), BcError> {
        let (order, source_classes) = index_last_wins(self.source.class_like_entities()?, |class| {
            class.name.as_str()
        });
        let (_, target_classes) = index_last_wins(self.target.class_like_entities()?, |class| {
            class.name.as_str()
        });

        for name in &order {
            let source_class = match source_classes.get(name) {
                Some(class) => class,
                None => continue,
            };
            let target_class = match target_classes.get(name) {
                Some(class) => class,
                None => {
                    self.incidents
                        .push(Incident::new(IncidentType::ClassDeleted, name.clone()));
                    continue;
                }
            };

            if !source_class.is_abstract && target_class.is_abstract {
                self.incidents
                    .push(Incident::new(IncidentType::ClassMadeAbstract, name.clone()));
            }
            if !source_class.is_final && target_class.is_final {
                self.incidents
                    .push(Incident::new(IncidentType::ClassMadeFinal, name.clone()));
            }

            self.check_constants(source_class, target_class)?;
            self.check_properties(source_class, target_class)?;
            self.check_methods(source_class, target_class)?;
        }
        Ok(())
    }

    fn check_constants(
        &mut self,
        source_class: &ClassEntity,
        target_class: &ClassEntity,
    ) -> Result<(), BcError> {
        let source_constants: Vec<ClassConstantRecord> =
            self.collect_members(self.source, source_class.id, None)?;
        let target_constants: Vec<ClassConstantRecord> =
            self.collect_members(self.target, target_class.id, None)?;
        let target_names: HashSet<&str> = target_constants
            .iter()
            .map(|constant| constant.name.as_str())
            .collect();

        for constant in declared_here(&source_constants, source_class.id) {
            if !target_names.contains(constant.name.as_str()) {
                self.incidents.push(Incident::new(
                    IncidentType::ClassConstantDeleted,
                    format!("{}::{}", source_class.name, constant.name),
                ));
            }
        }
        Ok(())
    }

    fn check_properties(
        &mut self,
        source_class: &ClassEntity,
        target_class: &ClassEntity,
    ) -> Result<(), BcError> {
        let scopes = covered_scopes(source_class, target_class);
        let source_properties: Vec<PropertyRecord> =
            self.collect_members(self.source, source_class.id, Some(scopes))?;
        let target_properties: Vec<PropertyRecord> =
            self.collect_members(self.target, target_class.id, None)?;

        for property in declared_here(&source_properties, source_class.id) {
            let element = format!("{}::${}", source_class.name, property.name);
            let target_property = match target_properties
                .iter()
                .find(|candidate| candidate.name == property.name)
            {
                Some(found) => found,
                None => {
                    self.incidents
                        .push(Incident::new(IncidentType::PropertyDeleted, element));
                    continue;
                }
            };

            if !property.is_static && target_property.is_static {
                self.incidents.push(Incident::new(
                    IncidentType::PropertyMadeStatic,
                    element.clone(),
                ));
            }
            if property.is_static && !target_property.is_static {
                self.incidents.push(Incident::new(
                    IncidentType::PropertyMadeNonStatic,
                    element.clone(),
                ));
            }
            if property.scope > target_property.scope {
                self.incidents.push(Incident::with_change(
                    IncidentType::PropertyScopeReduced,
                    element,
                    property.scope.name(),
                    target_property.scope.name(),
                ));
            }
        }
        Ok(())
    }

    fn check_methods(
        &mut self,
        source_class: &ClassEntity,
        target_class: &ClassEntity,
    ) -> Result<(), BcError> {
        let scopes = covered_scopes(source_class, target_class);
        let source_methods: Vec<MethodRecord> =
            self.collect_members(self.source, source_class.id, Some(scopes))?;
        let target_methods: Vec<MethodRecord> =
            self.collect_members(self.target, target_class.id, None)?;

        for method in declared_here(&source_methods, source_class.id) {
            let element = format!("{}::{}", source_class.name, method.name);
            let target_method =
                resolve_target_method(&target_methods, &method.name, &source_class.name);
            let target_method = match target_method {
                Some(found) => found,
                None => {
                    self.incidents
                        .push(Incident::new(IncidentType::MethodDeleted, element));
                    continue;
                }
            };
            self.check_method_pair(source_class, method, target_method, element)?;
        }
        Ok(())
    }

    fn check_method_pair(
        &mut self,
        source_class: &ClassEntity,
        method: &MethodRecord,
        target_method: &MethodRecord,
        element: String,
    ) -> Result<(), BcError> {
        if !method.is_abstract && target_method.is_abstract {
            self.incidents.push(Incident::new(
                IncidentType::MethodMadeAbstract,
                element.clone(),
            ));
        }
        if !method.is_final && target_method.is_final {
            self.incidents
                .push(Incident::new(IncidentType::MethodMadeFinal, element.clone()));
        }
        if !method.is_static && target_method.is_static {
            self.incidents.push(Incident::new(
                IncidentType::MethodMadeStatic,
                element.clone(),
            ));
        }
        if method.is_static && !target_method.is_static {
            self.incidents.push(Incident::new(
                IncidentType::MethodMadeNonStatic,
                element.clone(),
            ));
        }

        let source_signature = self.method_signature(self.source, source_class, method)?;
        let target_signature = self.method_signature(self.target, source_class, target_method)?;
        if source_signature != target_signature {
            self.incidents.push(Incident::with_change(
                IncidentType::MethodSignatureChanged,
                element.clone(),
                source_signature.clone(),
                target_signature,
            ));
        }

        if method.scope > target_method.scope
            && !self.dialect.suppresses_scope_reduction(
                &source_class.name,
                &method.name,
                &source_signature,
            )
        {
            self.incidents.push(Incident::with_change(
                IncidentType::MethodScopeReduced,
                element,
                method.scope.name(),
                target_method.scope.name(),
            ));
        }
        Ok(())
    }

    /// Renders a method's parameter signature in the dialect's canonical
    /// form. Dialect predicates key off the source-side class name for both
    /// snapshots so renames on the target cannot flip the policy mid-class.
    fn method_signature(
        &self,
        snapshot: &dyn Snapshot,
        source_class: &ClassEntity,
        method: &MethodRecord,
    ) -> Result<String, BcError> {
        let parameters = snapshot.parameters(ParameterOwner::Method(method.id))?;
        Ok(self
            .dialect
            .normalize_signature(&source_class.name, &render_signature(&parameters)))
    }

    fn collect_members<T: Collectible>(
        &self,
        snapshot: &dyn Snapshot,
        class_id: i64,
        scopes: Option<&[Scope]>,
    ) -> Result<Vec<T>, BcError> {
        let mut visited = HashSet::new();
        let (records, _) = self.collect_recursive(snapshot, class_id, scopes, &mut visited)?;
        Ok(records)
    }

    /// Collects the class's own records plus any inherited ones the class
    /// does not redeclare, walking parent and interface relations. The
    /// visited set keeps malformed relation graphs with cycles from
    /// recursing forever. Returns whether the walk saw the whole subtree;
    /// only complete results are cached, since a subtree cut short by the
    /// visited set would poison later lookups of the related class.
    fn collect_recursive<T: Collectible>(
        &self,
        snapshot: &dyn Snapshot,
        class_id: i64,
        scopes: Option<&[Scope]>,
        visited: &mut HashSet<i64>,
    ) -> Result<(Vec<T>, bool), BcError> {
        let key = class_lookup_key(snapshot.identity(), T::KIND, class_id, scopes);
        if let Some(payload) = self.cache.get(&key) {
            if let Ok(records) = serde_json::from_str::<Vec<T>>(&payload) {
                return Ok((records, true));
            }
        }

        visited.insert(class_id);
        let mut records = T::fetch(snapshot, class_id, scopes)?;
        let mut complete = true;
        for relation in self.related_classes(snapshot, class_id)? {
            if visited.contains(&relation.related_id) {
                complete = false;
                continue;
            }
            let (inherited, subtree_complete) =
                self.collect_recursive::<T>(snapshot, relation.related_id, scopes, visited)?;
            complete = complete && subtree_complete;
            for record in inherited {
                let name = record.entity_name();
                if !records.iter().any(|existing| existing.entity_name() == name) {
                    records.push(record);
                }
            }
        }

        if complete {
            if let Ok(payload) = serde_json::to_string(&records) {
                self.cache.put(&key, payload, Some(LOOKUP_TTL));
            }
        }
        Ok((records, complete))
    }

    fn related_classes(
        &self,
        snapshot: &dyn Snapshot,
        class_id: i64,
    ) -> Result<Vec<RelationRecord>, BcError> {
        let key = class_lookup_key(snapshot.identity(), "class_relations", class_id, None);
        if let Some(payload) = self.cache.get(&key) {
            if let Ok(records) = serde_json::from_str::<Vec<RelationRecord>>(&payload) {
                return Ok(records);
            }
        }

        // Relations whose target never made it into the snapshot are stored
        // with a zero id and cannot be walked.
        let records: Vec<RelationRecord> = snapshot
            .class_relations(class_id)?
            .into_iter()
            .filter(|relation| relation.related_id != 0)
            .collect();
        if let Ok(payload) = serde_json::to_string(&records) {
            self.cache.put(&key, payload, Some(LOOKUP_TTL));
        }
        Ok(records)
    }
}

/// A member kind the recursive collector can gather and cache.
trait Collectible: Serialize + DeserializeOwned {
    const KIND: &'static str;

    fn fetch(snapshot: &dyn Snapshot, class_id: i64, scopes: Option<&[Scope]>)
        -> DbResult<Vec<Self>>;

    fn entity_name(&self) -> &str;

    fn declaring_class(&self) -> i64;
}

impl Collectible for ClassConstantRecord {
    const KIND: &'static str = "class_constants";

    fn fetch(
        snapshot: &dyn Snapshot,
        class_id: i64,
        _scopes: Option<&[Scope]>,
    ) -> DbResult<Vec<Self>> {
        // Constants carry no scope, so the filter never applies to them.
        snapshot.class_constants(class_id)
    }

    fn entity_name(&self) -> &str {
        &self.name
    }

    fn declaring_class(&self) -> i64 {
        self.class_id
    }
}

impl Collectible for PropertyRecord {
    const KIND: &'static str = "class_properties";

    fn fetch(
        snapshot: &dyn Snapshot,
        class_id: i64,
        scopes: Option<&[Scope]>,
    ) -> DbResult<Vec<Self>> {
        snapshot.class_members(class_id, scopes)
    }

    fn entity_name(&self) -> &str {
        &self.name
    }

    fn declaring_class(&self) -> i64 {
        self.class_id
    }
}

impl Collectible for MethodRecord {
    const KIND: &'static str = "class_methods";

    fn fetch(
        snapshot: &dyn Snapshot,
        class_id: i64,
        scopes: Option<&[Scope]>,
    ) -> DbResult<Vec<Self>> {
        snapshot.class_methods(class_id, scopes)
    }

    fn entity_name(&self) -> &str {
        &self.name
    }

    fn declaring_class(&self) -> i64 {
        self.class_id
    }
}

/// Filters a collected list down to the members the class declares itself;
/// inherited members only count towards presence on the target side.
fn declared_here<T: Collectible>(records: &[T], class_id: i64) -> impl Iterator<Item = &T> {
    records
        .iter()
        .filter(move |record| record.declaring_class() == class_id)
}

fn covered_scopes(source_class: &ClassEntity, target_class: &ClassEntity) -> &'static [Scope] {
    if source_class.is_final && target_class.is_final {
        &FINAL_CLASS_SCOPES
    } else {
        &COVERED_SCOPES
    }
}

/// Looks a source method up on the target, treating a legacy constructor
/// named after its class and `__construct` as the same method. The match is
/// exact on names, so only the two constructor spellings alias each other.
fn resolve_target_method<'a>(
    target_methods: &'a [MethodRecord],
    method_name: &str,
    class_name: &str,
) -> Option<&'a MethodRecord> {
    let find = |name: &str| {
        target_methods
            .iter()
            .find(|candidate| candidate.name == name)
    };
    if let Some(found) = find(method_name) {
        return Some(found);
    }
    if method_name == class_name {
        return find("__construct");
    }
    if method_name == "__construct" {
        return find(class_name);
    }
    None
}
