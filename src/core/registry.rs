//! Purpose: Model definitions, the type-name registry, and the output graph.
//! Exports: `ModelDefinition`, `SchemaModel`, `ModelRegistry`, `ModelInstance`, `Related`.
//! Role: Capability seam between the decoder and host-application domain models.
//! Invariants: Registered definitions are read-only during an in-flight resolution.
//! Invariants: Reserved `type`/`id` are never copied from attributes; the resolver
//! assigns them last from the resource itself.

use crate::core::error::Error;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Factory for one domain model type. Implemented once per model; no
/// inheritance, just a uniform construction capability plus the names the
/// expected-type check compares against.
pub trait ModelDefinition: Send + Sync {
    fn singular_name(&self) -> &str;

    fn plural_name(&self) -> &str;

    /// Build an instance from a resource's `attributes` mapping. The decoder
    /// passes an empty mapping when the resource has no attributes.
    fn construct(&self, attributes: &Map<String, Value>) -> Result<ModelInstance, Error>;
}

/// A related value attached to a resolved instance. When the referenced
/// resource is present in `included` it resolves to a full instance;
/// otherwise the raw id is kept so callers retain the reference.
#[derive(Clone, Debug, PartialEq)]
pub enum Related {
    One(Box<ModelInstance>),
    Many(Vec<ModelInstance>),
    Reference(String),
    References(Vec<String>),
}

impl Related {
    fn to_value(&self) -> Value {
        match self {
            Related::One(instance) => instance.to_value(),
            Related::Many(instances) => {
                Value::Array(instances.iter().map(ModelInstance::to_value).collect())
            }
            Related::Reference(id) => Value::String(id.clone()),
            Related::References(ids) => {
                Value::Array(ids.iter().map(|id| Value::String(id.clone())).collect())
            }
        }
    }
}

/// A decoded domain object: declared fields copied from attributes, resolved
/// relationships, and the `type`/`id` taken from the resource itself.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelInstance {
    pub type_name: String,
    pub id: Option<String>,
    pub fields: Map<String, Value>,
    pub related: BTreeMap<String, Related>,
}

impl ModelInstance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn related(&self, name: &str) -> Option<&Related> {
        self.related.get(name)
    }

    /// Plain-JSON projection of the instance and its resolved graph, for
    /// diagnostics and CLI output. Not JSON:API serialization: relationships
    /// are inlined and `type`/`id` overwrite any same-named field.
    pub fn to_value(&self) -> Value {
        let mut object = self.fields.clone();
        for (name, related) in &self.related {
            object.insert(name.clone(), related.to_value());
        }
        object.insert("type".to_string(), Value::String(self.type_name.clone()));
        if let Some(id) = &self.id {
            object.insert("id".to_string(), Value::String(id.clone()));
        }
        Value::Object(object)
    }
}

/// Declarative `ModelDefinition`: singular/plural names plus an allow-list of
/// fields to copy. An empty field list copies every attribute.
#[derive(Clone, Debug)]
pub struct SchemaModel {
    singular: String,
    plural: String,
    fields: Vec<String>,
}

impl SchemaModel {
    pub fn new(singular: impl Into<String>, plural: impl Into<String>) -> Self {
        Self {
            singular: singular.into(),
            plural: plural.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }
}

impl ModelDefinition for SchemaModel {
    fn singular_name(&self) -> &str {
        &self.singular
    }

    fn plural_name(&self) -> &str {
        &self.plural
    }

    fn construct(&self, attributes: &Map<String, Value>) -> Result<ModelInstance, Error> {
        let mut instance = ModelInstance::new();
        if self.fields.is_empty() {
            for (name, value) in attributes {
                if is_reserved(name) {
                    continue;
                }
                instance.fields.insert(name.clone(), value.clone());
            }
        } else {
            for name in &self.fields {
                if is_reserved(name) {
                    continue;
                }
                if let Some(value) = attributes.get(name) {
                    instance.fields.insert(name.clone(), value.clone());
                }
            }
        }
        Ok(instance)
    }
}

fn is_reserved(name: &str) -> bool {
    name == "type" || name == "id"
}

/// Registry of model definitions keyed by resource type name.
#[derive(Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, Arc<dyn ModelDefinition>>,
}

// Definitions are trait objects, so derive(Debug) is unavailable; the
// registered type names are the useful part anyway.
impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("types", &self.models.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, type_name: impl Into<String>, definition: Arc<dyn ModelDefinition>) {
        self.models.insert(type_name.into(), definition);
    }

    /// Register a `SchemaModel` under its singular name.
    pub fn register_schema(&mut self, model: SchemaModel) {
        let type_name = model.singular_name().to_string();
        self.register(type_name, Arc::new(model));
    }

    pub fn lookup(&self, type_name: &str) -> Option<&dyn ModelDefinition> {
        self.models.get(type_name).map(Arc::as_ref)
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }
}
