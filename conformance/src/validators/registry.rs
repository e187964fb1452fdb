//! Registry validator.
//!
//! Verifies that a mapping registry can encode and decode every class it holds:
//! - Every class declares exactly one identity field
//! - Semantic type tags are unique after expansion
//! - No two fields of a class map to the same predicate
//! - Every CURIE resolves through the registry context

use std::collections::HashMap;

use sp_mapper::Registry;

use crate::report::{ConformanceReport, TestResult};

const VALIDATOR: &str = "registry";

/// Validates a registry's class descriptors.
pub fn validate(registry: &Registry) -> ConformanceReport {
    let mut report = ConformanceReport::new();
    check_identity(registry, &mut report);
    check_tags(registry, &mut report);
    check_predicates(registry, &mut report);
    check_curies(registry, &mut report);
    report
}

fn check_identity(registry: &Registry, report: &mut ConformanceReport) {
    let bad: Vec<String> = registry
        .classes()
        .filter(|c| c.fields.iter().filter(|f| f.is_identity()).count() != 1)
        .map(|c| c.class.clone())
        .collect();
    if bad.is_empty() {
        report.push(TestResult::pass(
            format!("{VALIDATOR}/identity"),
            format!("All {} classes declare one identity field", registry.len()),
        ));
    } else {
        report.push(TestResult::fail_with_details(
            format!("{VALIDATOR}/identity"),
            format!("{} classes cannot be encoded without an identity field", bad.len()),
            bad,
        ));
    }
}

fn check_tags(registry: &Registry, report: &mut ConformanceReport) {
    let context = registry.context();
    let mut seen: HashMap<String, &str> = HashMap::new();
    let mut clashes = Vec::new();
    for class in registry.classes() {
        let tag = context.expand(&class.type_tag);
        if let Some(other) = seen.insert(tag.clone(), &class.class) {
            clashes.push(format!("{tag}: {other}, {}", class.class));
        }
    }
    if clashes.is_empty() {
        report.push(TestResult::pass(
            format!("{VALIDATOR}/tags"),
            "Semantic type tags are unique",
        ));
    } else {
        report.push(TestResult::fail_with_details(
            format!("{VALIDATOR}/tags"),
            "Semantic type tags shared by several classes",
            clashes,
        ));
    }
}

fn check_predicates(registry: &Registry, report: &mut ConformanceReport) {
    let mut clashes = Vec::new();
    for class in registry.classes() {
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for field in class.predicate_fields() {
            let Some(predicate) = field.expanded_predicate() else {
                continue;
            };
            if let Some(other) = seen.insert(predicate, &field.name) {
                clashes.push(format!(
                    "{}: {other} and {} map to {predicate}",
                    class.class, field.name
                ));
            }
        }
    }
    if clashes.is_empty() {
        report.push(TestResult::pass(
            format!("{VALIDATOR}/predicates"),
            "Every predicate maps to one field per class",
        ));
    } else {
        report.push(TestResult::fail_with_details(
            format!("{VALIDATOR}/predicates"),
            "Ambiguous predicate mappings",
            clashes,
        ));
    }
}

/// A term counts as resolved when expansion changed it or it is already an
/// absolute IRI.
fn resolves(registry: &Registry, term: &str) -> bool {
    registry.context().expand(term) != term || term.contains("://") || term.starts_with("urn:")
}

fn check_curies(registry: &Registry, report: &mut ConformanceReport) {
    let mut unresolved = Vec::new();
    for class in registry.classes() {
        if !resolves(registry, &class.type_tag) {
            unresolved.push(format!("{}: type tag {}", class.class, class.type_tag));
        }
        for field in class.predicate_fields() {
            if let Some(predicate) = field.predicate() {
                if !resolves(registry, predicate) {
                    unresolved.push(format!("{}.{}: {predicate}", class.class, field.name));
                }
            }
        }
    }
    if unresolved.is_empty() {
        report.push(TestResult::pass(
            format!("{VALIDATOR}/context"),
            "All CURIEs resolve through the context",
        ));
    } else {
        report.push(
            TestResult::warn(
                format!("{VALIDATOR}/context"),
                format!("{} terms use an unbound prefix", unresolved.len()),
            )
            .with_details(unresolved),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp_mapper::Context;

    #[test]
    fn global_registry_conforms() {
        let report = validate(Registry::global().unwrap());
        let failures: Vec<_> = report.results.iter().filter(|r| r.is_failure()).collect();
        assert!(failures.is_empty(), "registry failures: {failures:#?}");
        assert_eq!(report.count(crate::Severity::Warning), 0);
    }

    #[test]
    fn flags_missing_identity_and_unbound_prefixes() {
        let mut registry = Registry::new(Context::streampipes());
        registry
            .define("Reading", "sp:Reading")
            .unwrap()
            .literal("label", "rdfs:label")
            .unwrap()
            .literal("unit", "qudt:unit")
            .unwrap();
        let report = validate(&registry);
        assert!(report.by_validator("registry/identity").all(TestResult::is_failure));
        assert!(!report.by_validator("registry/predicates").any(TestResult::is_failure));
        let context = report.by_validator("registry/context").next().unwrap();
        assert_eq!(context.severity, crate::Severity::Warning);
        assert_eq!(context.details, vec!["Reading.unit: qudt:unit".to_owned()]);
    }
}
