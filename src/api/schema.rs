//! Purpose: Declarative schema files that build a `ModelRegistry`.
//! Exports: `SchemaFile`, `SchemaEntry`, `load_registry`.
//! Role: Lets the CLI and embedders register models without writing trait impls.
//! Invariants: Schema parsing failures surface as `InvalidInput` with source.

use crate::core::error::{Error, ErrorKind};
use crate::core::registry::{ModelRegistry, SchemaModel};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct SchemaFile {
    pub models: Vec<SchemaEntry>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SchemaEntry {
    /// Resource type name; also the registry key and the singular name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Plural name; defaults to the type name with an `s` suffix.
    pub plural: Option<String>,
    /// Allow-listed attribute fields; empty means copy all attributes.
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Parse a schema document and register one `SchemaModel` per entry.
pub fn load_registry(input: &str) -> Result<ModelRegistry, Error> {
    let schema: SchemaFile = serde_json::from_str(input).map_err(|err| {
        Error::new(ErrorKind::InvalidInput)
            .with_message("schema is not valid JSON")
            .with_source(err)
    })?;

    let mut registry = ModelRegistry::new();
    for entry in schema.models {
        let plural = entry
            .plural
            .unwrap_or_else(|| format!("{}s", entry.type_name));
        let model = SchemaModel::new(&entry.type_name, plural).with_fields(entry.fields);
        registry.register_schema(model);
    }
    Ok(registry)
}
