//! Document validator.
//!
//! Checks a triple document against a registry before (and by) decoding it:
//! - Subjects appear in one block each
//! - Every block carries a registered semantic type tag
//! - Predicates are mapped by the block's class (warning when lenient)
//! - Single-valued fields receive at most one value
//! - Entity-ranged objects are references to subjects of the document
//! - The document decodes

use std::collections::{HashMap, HashSet};

use sp_mapper::context::iris::RDF_TYPE;
use sp_mapper::{
    ClassDescriptor, Decoder, Document, MapperConfig, Multiplicity, Object, Range, Registry,
};
use tracing::debug;

use crate::report::{ConformanceReport, TestResult};

const VALIDATOR: &str = "document";

/// Validates `doc` against `registry` under `config`.
pub fn validate(doc: &Document, registry: &Registry, config: &MapperConfig) -> ConformanceReport {
    let mut report = ConformanceReport::new();

    check_subjects(doc, &mut report);
    let classes = check_types(doc, registry, &mut report);
    check_predicates(doc, registry, config, &classes, &mut report);
    check_cardinality(doc, registry, &classes, &mut report);
    check_references(doc, registry, config, &classes, &mut report);

    match Decoder::new(registry, config).decode(doc) {
        Ok(roots) => report.push(TestResult::pass(
            format!("{VALIDATOR}/decode"),
            format!("Decoded {} root entities from {} subjects", roots.len(), doc.blocks.len()),
        )),
        Err(e) => report.push(TestResult::fail(format!("{VALIDATOR}/decode"), e.to_string())),
    }

    debug!(
        subjects = doc.blocks.len(),
        failures = report.failure_count(),
        "validated document"
    );
    report
}

fn result(name: &str, problems: Vec<String>, ok: &str, failing: bool, what: &str) -> TestResult {
    let validator = format!("{VALIDATOR}/{name}");
    if problems.is_empty() {
        TestResult::pass(validator, ok)
    } else if failing {
        TestResult::fail_with_details(validator, format!("{} {what}", problems.len()), problems)
    } else {
        TestResult::warn(validator, format!("{} {what}", problems.len())).with_details(problems)
    }
}

fn check_subjects(doc: &Document, report: &mut ConformanceReport) {
    let mut seen = HashSet::new();
    let duplicates: Vec<String> = doc
        .blocks
        .iter()
        .filter(|b| !seen.insert(b.subject.as_str()))
        .map(|b| b.subject.clone())
        .collect();
    report.push(result(
        "subjects",
        duplicates,
        "Every subject has one block",
        true,
        "subjects appear in several blocks",
    ));
}

/// Resolves each subject's class, reporting blocks without a usable tag.
fn check_types<'r>(
    doc: &Document,
    registry: &'r Registry,
    report: &mut ConformanceReport,
) -> HashMap<String, &'r ClassDescriptor> {
    let mut classes = HashMap::new();
    let mut problems = Vec::new();
    for block in &doc.blocks {
        let tags: Vec<&str> = block.types(registry.context()).collect();
        match tags.iter().find_map(|t| registry.class_for_tag(t)) {
            Some(class) => {
                classes.insert(block.subject.clone(), class);
            }
            None if tags.is_empty() => problems.push(format!("{}: no rdf:type", block.subject)),
            None => problems.push(format!("{}: unknown type {}", block.subject, tags.join(", "))),
        }
    }
    report.push(result(
        "types",
        problems,
        "Every subject has a registered type",
        true,
        "subjects without a registered type",
    ));
    classes
}

fn check_predicates(
    doc: &Document,
    registry: &Registry,
    config: &MapperConfig,
    classes: &HashMap<String, &ClassDescriptor>,
    report: &mut ConformanceReport,
) {
    let context = registry.context();
    let mut problems = Vec::new();
    for block in &doc.blocks {
        let Some(class) = classes.get(&block.subject) else {
            continue;
        };
        for (predicate, _) in &block.pairs {
            let expanded = context.expand(predicate);
            if expanded != RDF_TYPE && class.field_for_predicate(&expanded).is_none() {
                problems.push(format!(
                    "{}: {predicate} is not mapped by {}",
                    block.subject, class.class
                ));
            }
        }
    }
    report.push(result(
        "predicates",
        problems,
        "Every predicate is mapped",
        config.strict,
        "unmapped predicates",
    ));
}

fn check_cardinality(
    doc: &Document,
    registry: &Registry,
    classes: &HashMap<String, &ClassDescriptor>,
    report: &mut ConformanceReport,
) {
    let context = registry.context();
    let mut problems = Vec::new();
    for block in &doc.blocks {
        let Some(class) = classes.get(&block.subject) else {
            continue;
        };
        for field in class.predicate_fields() {
            if field.multiplicity != Multiplicity::Single {
                continue;
            }
            let count = block
                .pairs
                .iter()
                .filter(|(p, _)| Some(context.expand(p).as_str()) == field.expanded_predicate())
                .count();
            if count > 1 {
                problems.push(format!("{}: {} has {count} values", block.subject, field.name));
            }
        }
    }
    report.push(result(
        "cardinality",
        problems,
        "Single-valued fields have at most one value",
        true,
        "single-valued fields with several values",
    ));
}

fn check_references(
    doc: &Document,
    registry: &Registry,
    config: &MapperConfig,
    classes: &HashMap<String, &ClassDescriptor>,
    report: &mut ConformanceReport,
) {
    let context = registry.context();
    let subjects: HashSet<&str> = doc.blocks.iter().map(|b| b.subject.as_str()).collect();
    let mut literals = Vec::new();
    let mut dangling = Vec::new();
    for block in &doc.blocks {
        let Some(class) = classes.get(&block.subject) else {
            continue;
        };
        for (predicate, object) in &block.pairs {
            let Some(field) = class.field_for_predicate(&context.expand(predicate)) else {
                continue;
            };
            if field.range() != Some(Range::Entity) {
                continue;
            }
            match object {
                Object::Literal(text) => {
                    literals.push(format!(
                        "{}: {} holds literal {text:?}",
                        block.subject, field.name
                    ));
                }
                Object::Iri(target) if !subjects.contains(target.as_str()) => {
                    dangling.push(format!("{}: {} -> {target}", block.subject, field.name));
                }
                Object::Iri(_) => {}
            }
        }
    }
    report.push(result(
        "objects",
        literals,
        "Entity-ranged fields hold references",
        true,
        "entity-ranged fields holding literals",
    ));
    report.push(result(
        "references",
        dangling,
        "Every reference resolves within the document",
        config.strict,
        "references to subjects outside the document",
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Severity;
    use sp_mapper::model::{AddNestedRule, Entity};
    use sp_mapper::{Encoder, SubjectBlock};

    fn severity(report: &ConformanceReport, name: &str) -> Severity {
        report
            .by_validator(&format!("document/{name}"))
            .map(|r| r.severity)
            .next()
            .unwrap()
    }

    #[test]
    fn encoded_documents_conform() {
        let registry = Registry::global().unwrap();
        let config = MapperConfig::strict();
        let doc = Encoder::new(registry, &config)
            .encode(&AddNestedRule::new("position").to_instance())
            .unwrap();
        let report = validate(&doc, registry, &config);
        assert!(report.all_passed(), "{report:#?}");
        assert_eq!(report.count(Severity::Warning), 0);
    }

    #[test]
    fn curie_type_predicates_resolve() {
        let registry = Registry::global().unwrap();
        let mut rule = SubjectBlock::new("urn:rule:2");
        rule.push("rdf:type", Object::Iri("sp:DeleteRuleDescription".into()));
        rule.push("sp:runtimeKey", Object::Literal("debug".into()));
        let mut doc = Document::new();
        doc.push(rule);

        let report = validate(&doc, registry, &MapperConfig::strict());
        assert_eq!(severity(&report, "types"), Severity::Pass);
        assert!(report.all_passed(), "{report:#?}");
    }

    fn messy() -> Document {
        let mut rule = SubjectBlock::new("urn:rule:1");
        rule.push_type("sp:CreateNestedRuleDescription");
        rule.push("sp:runtimeKey", Object::Literal("a".into()));
        rule.push("sp:runtimeKey", Object::Literal("b".into()));
        rule.push("sp:comment", Object::Literal("unmapped".into()));
        let mut schema = SubjectBlock::new("urn:schema:1");
        schema.push_type("sp:EventSchema");
        schema.push("sp:hasEventProperty", Object::Iri("urn:p:missing".into()));
        let untyped = SubjectBlock::new("urn:untyped");
        let mut doc = Document::new();
        doc.push(rule);
        doc.push(schema);
        doc.push(untyped);
        doc
    }

    #[test]
    fn lenient_mode_warns_about_droppable_content() {
        let registry = Registry::global().unwrap();
        let report = validate(&messy(), registry, &MapperConfig::default());
        assert_eq!(severity(&report, "subjects"), Severity::Pass);
        assert_eq!(severity(&report, "types"), Severity::Failure);
        assert_eq!(severity(&report, "predicates"), Severity::Warning);
        assert_eq!(severity(&report, "cardinality"), Severity::Failure);
        assert_eq!(severity(&report, "references"), Severity::Warning);
        assert_eq!(severity(&report, "decode"), Severity::Failure);
    }

    #[test]
    fn strict_mode_fails_on_the_same_content() {
        let registry = Registry::global().unwrap();
        let report = validate(&messy(), registry, &MapperConfig::strict());
        assert_eq!(severity(&report, "predicates"), Severity::Failure);
        assert_eq!(severity(&report, "references"), Severity::Failure);
    }
}
