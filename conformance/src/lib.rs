//! StreamPipes mapping conformance suite.
//!
//! Validators that check mapping registries and RDF documents before they
//! reach the decoder, reporting every problem at once instead of stopping at
//! the first error.
//!
//! # Conformance Scope
//!
//! | Input | Checks |
//! |-------|--------|
//! | Registry | one identity field per class, unique tags, unambiguous predicates, resolvable CURIEs |
//! | Document | unique subjects, registered types, mapped predicates, cardinality, references, decode |
//! | JSON-LD file | JSON syntax, `@context`, node structure, then the document checks |
//!
//! # Entry Point
//!
//! ```no_run
//! use std::path::Path;
//!
//! use sp_conformance::validate_file;
//! use sp_mapper::{MapperConfig, Registry};
//!
//! let registry = Registry::global()?;
//! let report = validate_file(Path::new("pipeline.jsonld"), registry, &MapperConfig::default())?;
//! assert!(report.all_passed());
//! # Ok::<(), anyhow::Error>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod report;
pub mod validators;

use std::path::Path;

use sp_mapper::{Document, MapperConfig, Registry};

pub use report::{ConformanceReport, Severity, TestResult};

/// Validates a registry's class descriptors.
pub fn validate_registry(registry: &Registry) -> ConformanceReport {
    validators::registry::validate(registry)
}

/// Validates an in-memory document against `registry`.
pub fn validate_document(
    doc: &Document,
    registry: &Registry,
    config: &MapperConfig,
) -> ConformanceReport {
    validators::document::validate(doc, registry, config)
}

/// Validates a JSON-LD file: the registry first, then the file's content.
///
/// # Errors
///
/// Returns an error only if a file system operation fails.
pub fn validate_file(
    path: &Path,
    registry: &Registry,
    config: &MapperConfig,
) -> anyhow::Result<ConformanceReport> {
    let mut report = ConformanceReport::new();
    report.extend(validate_registry(registry));
    report.extend(validators::jsonld::validate(path, registry, config)?);
    Ok(report)
}
