//! Validators for registries, in-memory documents, and JSON-LD files.

pub mod document;
pub mod jsonld;
pub mod registry;
