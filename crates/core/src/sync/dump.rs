use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::{ClassKind, RawRelation, Scope};

/// Root of a reflection dump: everything the indexer captured about one
/// codebase, grouped by file.
///
/// The builder methods exist mostly for tests and tooling that assemble
/// dumps programmatically; production dumps arrive as JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReflectionDump {
    #[serde(default)]
    pub files: Vec<DumpFile>,
}

impl ReflectionDump {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, file: DumpFile) -> Self {
        self.files.push(file);
        self
    }
}

/// One source file and the entities declared in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpFile {
    /// Project-relative path; identifies the file across syncs.
    pub path: String,
    /// Size in bytes; an unchanged size skips re-collection.
    pub size: i64,
    #[serde(default)]
    pub classes: Vec<DumpClass>,
    #[serde(default)]
    pub functions: Vec<DumpFunction>,
    #[serde(default)]
    pub constants: Vec<DumpConstant>,
}

impl DumpFile {
    pub fn new(path: impl Into<String>, size: i64) -> Self {
        Self {
            path: path.into(),
            size,
            classes: Vec::new(),
            functions: Vec::new(),
            constants: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: DumpClass) -> Self {
        self.classes.push(class);
        self
    }

    pub fn with_function(mut self, function: DumpFunction) -> Self {
        self.functions.push(function);
        self
    }

    pub fn with_constant(mut self, constant: DumpConstant) -> Self {
        self.constants.push(constant);
        self
    }
}

/// A class, interface or trait declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpClass {
    pub name: String,
    pub kind: ClassKind,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_final: bool,
    /// Unresolved inheritance edges; resolved against the knowledge base
    /// after all files are collected.
    #[serde(default)]
    pub relations: Vec<RawRelation>,
    #[serde(default)]
    pub constants: Vec<DumpClassConstant>,
    #[serde(default)]
    pub properties: Vec<DumpProperty>,
    #[serde(default)]
    pub methods: Vec<DumpMethod>,
}

impl DumpClass {
    pub fn new(name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            is_abstract: false,
            is_final: false,
            relations: Vec::new(),
            constants: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn with_relation(mut self, relation: RawRelation) -> Self {
        self.relations.push(relation);
        self
    }

    pub fn with_constant(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.constants.push(DumpClassConstant { name: name.into(), value: value.into() });
        self
    }

    pub fn with_property(mut self, property: DumpProperty) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_method(mut self, method: DumpMethod) -> Self {
        self.methods.push(method);
        self
    }
}

/// A constant declared on a class-like.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpClassConstant {
    pub name: String,
    pub value: String,
}

/// A property declared on a class-like.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpProperty {
    pub name: String,
    #[serde(default)]
    pub value: String,
    pub scope: Scope,
    #[serde(default)]
    pub is_static: bool,
}

impl DumpProperty {
    pub fn new(name: impl Into<String>, scope: Scope) -> Self {
        Self { name: name.into(), value: String::new(), scope, is_static: false }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }
}

/// A method declared on a class-like.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpMethod {
    pub name: String,
    pub scope: Scope,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_variadic: bool,
    #[serde(default)]
    pub returns_reference: bool,
    #[serde(default)]
    pub has_return_type: bool,
    #[serde(default)]
    pub return_type: Option<String>,
    /// Position is the list order.
    #[serde(default)]
    pub parameters: Vec<DumpParameter>,
}

impl DumpMethod {
    pub fn new(name: impl Into<String>, scope: Scope) -> Self {
        Self {
            name: name.into(),
            scope,
            is_abstract: false,
            is_final: false,
            is_static: false,
            is_variadic: false,
            returns_reference: false,
            has_return_type: false,
            return_type: None,
            parameters: Vec::new(),
        }
    }

    pub fn with_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_return_type(mut self, return_type: impl Into<String>) -> Self {
        self.has_return_type = true;
        self.return_type = Some(return_type.into());
        self
    }

    pub fn with_parameter(mut self, parameter: DumpParameter) -> Self {
        if parameter.is_variadic {
            self.is_variadic = true;
        }
        self.parameters.push(parameter);
        self
    }
}

/// One parameter of a method or free function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpParameter {
    /// Bare name, without the `$` sigil.
    pub name: String,
    #[serde(default)]
    pub type_class: Option<String>,
    #[serde(default)]
    pub has_type: bool,
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub allows_null: bool,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default)]
    pub is_callable: bool,
    #[serde(default)]
    pub is_optional: bool,
    #[serde(default)]
    pub is_variadic: bool,
    #[serde(default = "default_true")]
    pub can_be_passed_by_value: bool,
    #[serde(default)]
    pub is_passed_by_reference: bool,
    /// Distinguishes "defaults to null" from "has no default".
    #[serde(default)]
    pub has_default_value: bool,
    #[serde(default)]
    pub default_value: Value,
    /// Set when the default is a named constant; rendered verbatim.
    #[serde(default)]
    pub default_constant: Option<String>,
}

impl DumpParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_class: None,
            has_type: false,
            type_name: None,
            allows_null: false,
            is_array: false,
            is_callable: false,
            is_optional: false,
            is_variadic: false,
            can_be_passed_by_value: true,
            is_passed_by_reference: false,
            has_default_value: false,
            default_value: Value::Null,
            default_constant: None,
        }
    }

    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.has_type = true;
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_type_class(mut self, type_class: impl Into<String>) -> Self {
        self.type_class = Some(type_class.into());
        self
    }

    pub fn with_array(mut self) -> Self {
        self.is_array = true;
        self
    }

    pub fn with_callable(mut self) -> Self {
        self.is_callable = true;
        self
    }

    pub fn by_reference(mut self) -> Self {
        self.is_passed_by_reference = true;
        self.can_be_passed_by_value = false;
        self
    }

    pub fn variadic(mut self) -> Self {
        self.is_variadic = true;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.has_default_value = true;
        self.is_optional = true;
        self.default_value = value;
        self
    }

    pub fn with_default_constant(mut self, constant: impl Into<String>) -> Self {
        self.has_default_value = true;
        self.is_optional = true;
        self.default_constant = Some(constant.into());
        self
    }
}

/// A free function declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpFunction {
    pub name: String,
    #[serde(default)]
    pub is_variadic: bool,
    #[serde(default)]
    pub returns_reference: bool,
    #[serde(default)]
    pub has_return_type: bool,
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default)]
    pub parameters: Vec<DumpParameter>,
}

impl DumpFunction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_variadic: false,
            returns_reference: false,
            has_return_type: false,
            return_type: None,
            parameters: Vec::new(),
        }
    }

    pub fn with_return_type(mut self, return_type: impl Into<String>) -> Self {
        self.has_return_type = true;
        self.return_type = Some(return_type.into());
        self
    }

    pub fn with_parameter(mut self, parameter: DumpParameter) -> Self {
        if parameter.is_variadic {
            self.is_variadic = true;
        }
        self.parameters.push(parameter);
        self
    }
}

/// A global constant declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpConstant {
    pub name: String,
    pub value: String,
}

impl DumpConstant {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

fn default_true() -> bool {
    true
}
