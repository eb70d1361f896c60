// Core modules implementing document validation, the model registry,
// resolution, and error modeling.
pub mod document;
pub mod error;
pub mod registry;
pub mod resolve;
