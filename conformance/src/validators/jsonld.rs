//! JSON-LD file validator.
//!
//! Reads a JSON-LD file, checks its envelope, parses it into a document, and
//! runs the [document validator](super::document) on the result.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use sp_mapper::serializer::jsonld::from_json_ld;
use sp_mapper::{MapperConfig, Registry};

use crate::report::{ConformanceReport, TestResult};

const VALIDATOR: &str = "jsonld";

/// Validates a JSON-LD file.
///
/// A missing file or a parse failure is reported as a failed check.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn validate(
    path: &Path,
    registry: &Registry,
    config: &MapperConfig,
) -> Result<ConformanceReport> {
    let mut report = ConformanceReport::new();

    if !path.exists() {
        report.push(TestResult::fail(
            format!("{VALIDATOR}/file"),
            format!("{} not found", path.display()),
        ));
        return Ok(report);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let value: Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            report.push(TestResult::fail(
                format!("{VALIDATOR}/syntax"),
                format!("{} is not valid JSON: {e}", path.display()),
            ));
            return Ok(report);
        }
    };
    report.push(TestResult::pass(format!("{VALIDATOR}/syntax"), "Valid JSON"));

    check_context(&value, &mut report);
    report.extend(validate_value(&value, registry, config));
    Ok(report)
}

/// Validates an already parsed JSON-LD value.
pub fn validate_value(
    value: &Value,
    registry: &Registry,
    config: &MapperConfig,
) -> ConformanceReport {
    let mut report = ConformanceReport::new();
    match from_json_ld(value, registry.context()) {
        Ok(doc) => {
            report.push(TestResult::pass(
                format!("{VALIDATOR}/structure"),
                format!("{} subjects, {} triples", doc.blocks.len(), doc.triple_count()),
            ));
            report.extend(super::document::validate(&doc, registry, config));
        }
        Err(e) => report.push(TestResult::fail(format!("{VALIDATOR}/structure"), e.to_string())),
    }
    report
}

/// Documents without a local `@context` rely on the default prefixes.
fn check_context(value: &Value, report: &mut ConformanceReport) {
    match value.get("@context") {
        Some(Value::Object(_)) => {
            report.push(TestResult::pass(format!("{VALIDATOR}/context"), "Local @context present"));
        }
        Some(_) => report.push(TestResult::warn(
            format!("{VALIDATOR}/context"),
            "Only object-valued @context entries are applied",
        )),
        None => report.push(TestResult::warn(
            format!("{VALIDATOR}/context"),
            "No @context; terms are expanded with the default StreamPipes prefixes",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_file_fails() {
        let registry = Registry::global().unwrap();
        let report = validate(
            Path::new("/nonexistent/sp-mapper/doc.jsonld"),
            registry,
            &MapperConfig::default(),
        )
        .unwrap();
        assert_eq!(report.failure_count(), 1);
    }

    #[test]
    fn file_round_trip_conforms() {
        let registry = Registry::global().unwrap();
        let path = std::env::temp_dir()
            .join(format!("sp-conformance-{}.jsonld", std::process::id()));
        let doc = json!({
            "@context": { "sp": "https://streampipes.org/vocabulary/v1/" },
            "@graph": [{
                "@id": "urn:rule:1",
                "@type": "sp:DeleteRuleDescription",
                "sp:runtimeKey": "debug"
            }]
        });
        std::fs::write(&path, doc.to_string()).unwrap();
        let report = validate(&path, registry, &MapperConfig::strict()).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(report.all_passed(), "{report:#?}");
    }

    #[test]
    fn nodes_without_ids_fail_structure() {
        let registry = Registry::global().unwrap();
        let report = validate_value(
            &json!([{ "@type": "sp:DeleteRuleDescription" }]),
            registry,
            &MapperConfig::default(),
        );
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.results.len(), 1);
    }
}
