//! Purpose: Define the stable public Rust API boundary for sideload.
//! Exports: Core types and operations needed by embedders and the CLI.
//! Role: Public, additive-only surface; hides module internals.
//! Invariants: This module is the intended public path to decoder primitives.

mod schema;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::document::{Document, Identifier, Linkage, Resource};
pub use crate::core::error::{to_http_status, Error, ErrorKind};
pub use crate::core::registry::{
    ModelDefinition, ModelInstance, ModelRegistry, Related, SchemaModel,
};
pub use crate::core::resolve::{
    decode_document, decode_str, decode_value, Resolved, ResolveOptions,
};
pub use schema::{load_registry, SchemaEntry, SchemaFile};
