//! Purpose: Resolve validated documents into connected model instance graphs.
//! Exports: `decode_str`, `decode_value`, `decode_document`, `ResolveOptions`, `Resolved`.
//! Role: Second decoding stage; type-directed dispatch plus recursive include matching.
//! Invariants: The `included` collection is threaded immutably through every
//! recursive call; resolution never mutates the input document.
//! Invariants: A `(type, id)` pair already on the current resolution chain is
//! treated as not-included, so cyclic references fall back to raw ids.

use crate::core::document::{Document, Identifier, Linkage, Resource};
use crate::core::error::{Error, ErrorKind};
use crate::core::registry::{ModelInstance, ModelRegistry, Related};
use serde_json::{Map, Value};
use tracing::debug;

#[derive(Clone, Debug)]
pub struct ResolveOptions {
    /// Expected type for every primary resource; must match the resolved
    /// model's singular or plural name. `None` accepts any registered type.
    pub expected_type: Option<String>,
    /// Require a string `id` on primary resources. Disable when decoding a
    /// client-created resource awaiting a server-assigned id.
    pub require_id: bool,
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self {
            expected_type: None,
            require_id: true,
        }
    }

    pub fn with_expected_type(mut self, type_name: impl Into<String>) -> Self {
        self.expected_type = Some(type_name.into());
        self
    }

    pub fn allow_missing_id(mut self) -> Self {
        self.require_id = false;
        self
    }
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode result: one instance for a single-resource `data`, an ordered
/// sequence for an array `data` (input order preserved).
#[derive(Clone, Debug, PartialEq)]
pub enum Resolved {
    One(ModelInstance),
    Many(Vec<ModelInstance>),
}

impl Resolved {
    /// Plain-JSON projection of the decoded graph (see `ModelInstance::to_value`).
    pub fn to_value(&self) -> Value {
        match self {
            Resolved::One(instance) => instance.to_value(),
            Resolved::Many(instances) => {
                Value::Array(instances.iter().map(ModelInstance::to_value).collect())
            }
        }
    }
}

pub fn decode_str(
    input: &str,
    registry: &ModelRegistry,
    options: &ResolveOptions,
) -> Result<Resolved, Error> {
    decode_document(Document::from_str(input)?, registry, options)
}

pub fn decode_value(
    value: Value,
    registry: &ModelRegistry,
    options: &ResolveOptions,
) -> Result<Resolved, Error> {
    decode_document(Document::from_value(value)?, registry, options)
}

pub fn decode_document(
    document: Document,
    registry: &ModelRegistry,
    options: &ResolveOptions,
) -> Result<Resolved, Error> {
    let (data, included) = document.into_parts();
    let expected = options.expected_type.as_deref();
    match data {
        Value::Array(items) => {
            let mut instances = Vec::with_capacity(items.len());
            for item in &items {
                let mut chain = Vec::new();
                instances.push(resolve_resource(
                    item,
                    expected,
                    &included,
                    registry,
                    options.require_id,
                    &mut chain,
                )?);
            }
            Ok(Resolved::Many(instances))
        }
        single => {
            let mut chain = Vec::new();
            resolve_resource(
                &single,
                expected,
                &included,
                registry,
                options.require_id,
                &mut chain,
            )
            .map(Resolved::One)
        }
    }
}

fn resolve_resource(
    value: &Value,
    expected: Option<&str>,
    included: &[Value],
    registry: &ModelRegistry,
    require_id: bool,
    chain: &mut Vec<(String, String)>,
) -> Result<ModelInstance, Error> {
    let resource = Resource::from_value(value).ok_or_else(|| {
        Error::new(ErrorKind::MissingType).with_message("resource must be a JSON object")
    })?;

    let Some(type_name) = resource.type_name() else {
        return Err(
            Error::new(ErrorKind::MissingType).with_message("resource `type` must be a string")
        );
    };
    let id = resource.id();
    if require_id && id.is_none() {
        return Err(Error::new(ErrorKind::MissingId)
            .with_message("resource `id` must be a string")
            .with_type(type_name));
    }

    let definition = registry.lookup(type_name).ok_or_else(|| {
        Error::new(ErrorKind::UnknownType)
            .with_message("no model registered for resource type")
            .with_type(type_name)
    })?;
    if let Some(expected) = expected {
        if expected != definition.singular_name() && expected != definition.plural_name() {
            return Err(Error::new(ErrorKind::TypeMismatch)
                .with_message(format!(
                    "expected type `{expected}`, resolved model is `{}`/`{}`",
                    definition.singular_name(),
                    definition.plural_name()
                ))
                .with_type(type_name));
        }
    }

    let empty = Map::new();
    let attributes = resource.attributes().unwrap_or(&empty);
    let mut instance = definition.construct(attributes)?;

    if !included.is_empty() {
        if let Some(relationships) = resource.relationships() {
            if !relationships.is_empty() {
                chain.push((type_name.to_string(), id.unwrap_or("").to_string()));
                let outcome =
                    resolve_relationships(&mut instance, relationships, included, registry, chain);
                chain.pop();
                outcome?;
            }
        }
    }

    // Assigned last, from the resource itself; attributes never win here.
    instance.type_name = type_name.to_string();
    instance.id = id.map(str::to_string);
    Ok(instance)
}

fn resolve_relationships(
    instance: &mut ModelInstance,
    relationships: &Map<String, Value>,
    included: &[Value],
    registry: &ModelRegistry,
    chain: &mut Vec<(String, String)>,
) -> Result<(), Error> {
    for (name, relationship) in relationships {
        match Linkage::from_relationship(relationship) {
            Linkage::Empty => continue,
            Linkage::ToOne(identifier) => match find_included(included, &identifier, chain) {
                Some(item) => {
                    let related = resolve_resource(item, None, included, registry, true, chain)
                        .map_err(|err| tag_relationship(err, name))?;
                    instance
                        .related
                        .insert(name.clone(), Related::One(Box::new(related)));
                }
                None => {
                    instance
                        .related
                        .insert(name.clone(), Related::Reference(identifier.id.to_string()));
                }
            },
            Linkage::ToMany(identifiers) => {
                if identifiers.is_empty() {
                    instance.related.insert(name.clone(), Related::Many(Vec::new()));
                    continue;
                }
                let matched = collect_included(included, &identifiers, chain);
                if matched.is_empty() {
                    let ids = identifiers
                        .iter()
                        .map(|identifier| identifier.id.to_string())
                        .collect();
                    instance
                        .related
                        .insert(name.clone(), Related::References(ids));
                } else {
                    let mut resolved = Vec::with_capacity(matched.len());
                    for item in matched {
                        resolved.push(
                            resolve_resource(item, None, included, registry, true, chain)
                                .map_err(|err| tag_relationship(err, name))?,
                        );
                    }
                    instance.related.insert(name.clone(), Related::Many(resolved));
                }
            }
        }
    }
    Ok(())
}

/// First `included` item matching the identifier, unless the identifier is
/// already being resolved further up the chain.
fn find_included<'a>(
    included: &'a [Value],
    identifier: &Identifier<'_>,
    chain: &[(String, String)],
) -> Option<&'a Value> {
    if on_chain(chain, identifier) {
        debug!(
            type_name = identifier.type_name,
            id = identifier.id,
            "cyclic reference, keeping raw id"
        );
        return None;
    }
    included.iter().find(|item| {
        Resource::from_value(item).is_some_and(|resource| resource.matches(identifier))
    })
}

/// Every `included` item matching any identifier, in `included` order.
fn collect_included<'a>(
    included: &'a [Value],
    identifiers: &[Identifier<'_>],
    chain: &[(String, String)],
) -> Vec<&'a Value> {
    included
        .iter()
        .filter(|item| {
            let Some(resource) = Resource::from_value(item) else {
                return false;
            };
            identifiers
                .iter()
                .any(|identifier| resource.matches(identifier) && !on_chain(chain, identifier))
        })
        .collect()
}

fn on_chain(chain: &[(String, String)], identifier: &Identifier<'_>) -> bool {
    chain
        .iter()
        .any(|(type_name, id)| type_name == identifier.type_name && id == identifier.id)
}

fn tag_relationship(err: Error, name: &str) -> Error {
    if err.relationship().is_some() {
        return err;
    }
    err.with_relationship(name)
}
