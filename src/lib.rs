//! Purpose: Shared core library crate used by the `sideload` CLI and tests.
//! Exports: `core` (document validation, registry, resolution, errors), `api`.
//! Role: Validating decoder for JSON:API compound documents.
//! Invariants: Decoding is pure and synchronous; the registry is the only
//! state shared across calls, and it is read-only during resolution.
pub mod api;
pub mod core;
