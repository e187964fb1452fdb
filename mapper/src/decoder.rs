//! [`Document`] → entity instances.
//!
//! Each subject block resolves to a class through its `rdf:type` tag. Values
//! are grouped per field in document order; entity-ranged values naming
//! another subject of the same document are decoded recursively. The active
//! recursion path is tracked so that cycles fail instead of looping.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::config::MapperConfig;
use crate::context::iris::RDF_TYPE;
use crate::document::{Document, Object, SubjectBlock};
use crate::error::{MapperError, Result};
use crate::instance::{EntityInstance, FieldValue};
use crate::registry::{ClassDescriptor, FieldDescriptor, Multiplicity, Range, Registry};

/// Decodes documents against a registry.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'r> {
    registry: &'r Registry,
    strict: bool,
    max_depth: usize,
    max_nodes: usize,
}

impl<'r> Decoder<'r> {
    /// Creates a decoder using `config.strict`, `config.max_depth` and
    /// `config.max_nodes`.
    #[must_use]
    pub fn new(registry: &'r Registry, config: &MapperConfig) -> Self {
        Self {
            registry,
            strict: config.strict,
            max_depth: config.max_depth,
            max_nodes: config.max_nodes,
        }
    }

    /// Decodes every root entity of `doc`, in document order.
    ///
    /// Roots are the subjects no other subject references through an
    /// entity-ranged field; referenced subjects end up nested inside them.
    ///
    /// # Errors
    ///
    /// - [`MapperError::DuplicateIdentity`] for a repeated subject block.
    /// - [`MapperError::MissingSemanticType`] / [`MapperError::UnknownSemanticType`]
    ///   for a block without a usable type.
    /// - [`MapperError::UnmappedPredicate`] (strict mode only).
    /// - [`MapperError::CardinalityViolation`] for several values on a
    ///   single-valued field.
    /// - [`MapperError::ObjectMismatch`] for a literal on an entity field.
    /// - [`MapperError::UnresolvedReference`] (strict mode only).
    /// - [`MapperError::CyclicReference`] / [`MapperError::MaxDepthExceeded`]
    ///   for self-referential or overly deep input.
    /// - [`MapperError::NodeLimitExceeded`] when shared references would
    ///   build more than `max_nodes` entities.
    pub fn decode(&self, doc: &Document) -> Result<Vec<EntityInstance>> {
        let index = self.index(doc)?;

        let mut referenced: HashSet<&str> = HashSet::new();
        for block in &doc.blocks {
            let descriptor = self.resolve_class(block)?;
            for (predicate, object) in &block.pairs {
                let Object::Iri(target) = object else {
                    continue;
                };
                let expanded = self.registry.context().expand(predicate);
                let is_entity = descriptor
                    .field_for_predicate(&expanded)
                    .is_some_and(|f| f.range() == Some(Range::Entity));
                if is_entity && index.contains_key(target.as_str()) {
                    referenced.insert(target);
                }
            }
        }

        let mut state = State::default();
        let mut roots = Vec::new();
        for block in &doc.blocks {
            if !referenced.contains(block.subject.as_str()) {
                roots.push(self.decode_block(&block.subject, &index, &mut state, 0)?);
            }
        }
        // Anything still unvisited is only reachable through a cycle.
        for block in &doc.blocks {
            if !state.visited.contains(&block.subject) {
                roots.push(self.decode_block(&block.subject, &index, &mut state, 0)?);
            }
        }

        debug!(
            subjects = doc.blocks.len(),
            roots = roots.len(),
            strict = self.strict,
            "decoded document"
        );
        Ok(roots)
    }

    /// Decodes the entity rooted at `subject`, or `None` if the document has
    /// no block for it.
    ///
    /// # Errors
    ///
    /// See [`Decoder::decode`].
    pub fn decode_subject(&self, doc: &Document, subject: &str) -> Result<Option<EntityInstance>> {
        let index = self.index(doc)?;
        if !index.contains_key(subject) {
            return Ok(None);
        }
        let mut state = State::default();
        self.decode_block(subject, &index, &mut state, 0).map(Some)
    }

    fn index<'d>(&self, doc: &'d Document) -> Result<HashMap<&'d str, &'d SubjectBlock>> {
        let mut index = HashMap::with_capacity(doc.blocks.len());
        for block in &doc.blocks {
            if index.insert(block.subject.as_str(), block).is_some() {
                return Err(MapperError::DuplicateIdentity {
                    subject: block.subject.clone(),
                });
            }
        }
        Ok(index)
    }

    fn resolve_class(&self, block: &SubjectBlock) -> Result<&'r ClassDescriptor> {
        let mut first_tag = None;
        for tag in block.types(self.registry.context()) {
            if let Some(descriptor) = self.registry.class_for_tag(tag) {
                return Ok(descriptor);
            }
            first_tag.get_or_insert(tag);
        }
        match first_tag {
            Some(tag) => Err(MapperError::UnknownSemanticType {
                subject: block.subject.clone(),
                type_tag: tag.to_owned(),
            }),
            None => Err(MapperError::MissingSemanticType {
                subject: block.subject.clone(),
            }),
        }
    }

    fn decode_block(
        &self,
        subject: &str,
        index: &HashMap<&str, &SubjectBlock>,
        state: &mut State,
        depth: usize,
    ) -> Result<EntityInstance> {
        if depth > self.max_depth {
            return Err(MapperError::MaxDepthExceeded {
                subject: subject.to_owned(),
                limit: self.max_depth,
            });
        }
        state.nodes += 1;
        if state.nodes > self.max_nodes {
            return Err(MapperError::NodeLimitExceeded {
                subject: subject.to_owned(),
                limit: self.max_nodes,
            });
        }
        if state.path.iter().any(|s| s == subject) {
            return Err(MapperError::CyclicReference {
                subject: subject.to_owned(),
                path: state.path.clone(),
            });
        }
        let Some(block) = index.get(subject) else {
            return Err(MapperError::UnresolvedReference {
                subject: subject.to_owned(),
                field: String::new(),
                target: subject.to_owned(),
            });
        };

        let descriptor = self.resolve_class(block)?;
        let mut instance = EntityInstance::new(descriptor.class.clone());
        if let Some(identity) = descriptor.identity_field() {
            instance.set(identity.name.clone(), subject);
        }

        let groups = self.group(block, descriptor)?;
        state.path.push(subject.to_owned());
        for (field, objects) in groups {
            if field.multiplicity == Multiplicity::Single && objects.len() > 1 {
                return Err(MapperError::CardinalityViolation {
                    subject: subject.to_owned(),
                    field: field.name.clone(),
                    predicate: field.predicate().unwrap_or_default().to_owned(),
                    count: objects.len(),
                });
            }
            let value = match field.range() {
                Some(Range::Entity) => {
                    self.entity_value(subject, field, &objects, index, state, depth)?
                }
                _ => Some(literal_value(field, &objects)),
            };
            if let Some(value) = value {
                instance.set(field.name.clone(), value);
            }
        }
        state.path.pop();
        state.visited.insert(subject.to_owned());
        Ok(instance)
    }

    /// Groups the block's values by field, in document order.
    fn group<'a>(
        &self,
        block: &'a SubjectBlock,
        descriptor: &'r ClassDescriptor,
    ) -> Result<Vec<(&'r FieldDescriptor, Vec<&'a Object>)>> {
        let context = self.registry.context();
        let mut groups: Vec<(&FieldDescriptor, Vec<&Object>)> = Vec::new();
        for (predicate, object) in &block.pairs {
            let expanded = context.expand(predicate);
            if expanded == RDF_TYPE {
                continue;
            }
            let Some(field) = descriptor.field_for_predicate(&expanded) else {
                if self.strict {
                    return Err(MapperError::UnmappedPredicate {
                        subject: block.subject.clone(),
                        predicate: predicate.clone(),
                        class: descriptor.class.clone(),
                    });
                }
                warn!(
                    subject = %block.subject,
                    predicate = %predicate,
                    "dropping unmapped predicate"
                );
                continue;
            };
            match groups.iter_mut().find(|(f, _)| f.name == field.name) {
                Some((_, objects)) => objects.push(object),
                None => groups.push((field, vec![object])),
            }
        }
        Ok(groups)
    }

    fn entity_value(
        &self,
        subject: &str,
        field: &FieldDescriptor,
        objects: &[&Object],
        index: &HashMap<&str, &SubjectBlock>,
        state: &mut State,
        depth: usize,
    ) -> Result<Option<FieldValue>> {
        let mut children = Vec::with_capacity(objects.len());
        for object in objects {
            let Object::Iri(target) = object else {
                return Err(MapperError::ObjectMismatch {
                    subject: subject.to_owned(),
                    field: field.name.clone(),
                    expected: "a reference to a nested entity",
                });
            };
            if !index.contains_key(target.as_str()) {
                if self.strict {
                    return Err(MapperError::UnresolvedReference {
                        subject: subject.to_owned(),
                        field: field.name.clone(),
                        target: target.clone(),
                    });
                }
                warn!(
                    subject,
                    field = %field.name,
                    target = %target,
                    "dropping unresolved reference"
                );
                continue;
            }
            children.push(self.decode_block(target, index, state, depth + 1)?);
        }
        Ok(match field.multiplicity {
            Multiplicity::Multi => Some(FieldValue::EntityList(children)),
            Multiplicity::Single => children.pop().map(FieldValue::from),
        })
    }
}

#[derive(Default)]
struct State {
    path: Vec<String>,
    visited: HashSet<String>,
    nodes: usize,
}

fn literal_value(field: &FieldDescriptor, objects: &[&Object]) -> FieldValue {
    let mut values = objects.iter().map(|o| o.as_str().to_owned());
    match field.multiplicity {
        Multiplicity::Multi => FieldValue::StrList(values.collect()),
        Multiplicity::Single => FieldValue::Str(values.next().unwrap_or_default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_NODES;
    use crate::context::Context;
    use crate::encoder::Encoder;

    fn registry() -> Registry {
        let mut r = Registry::new(Context::streampipes());
        r.define("Sensor", "sp:Sensor")
            .unwrap()
            .identity("id")
            .unwrap()
            .literal("label", "rdfs:label")
            .unwrap()
            .literals("tags", "sp:tag")
            .unwrap()
            .entity("parent", "sp:parent")
            .unwrap()
            .entities("parts", "sp:hasPart")
            .unwrap();
        r
    }

    fn block(subject: &str, pairs: &[(&str, Object)]) -> SubjectBlock {
        let mut b = SubjectBlock::new(subject);
        b.push_type("sp:Sensor");
        for (p, o) in pairs {
            b.push(*p, o.clone());
        }
        b
    }

    fn lit(s: &str) -> Object {
        Object::Literal(s.to_owned())
    }

    fn iri(s: &str) -> Object {
        Object::Iri(s.to_owned())
    }

    fn doc(blocks: Vec<SubjectBlock>) -> Document {
        Document { blocks }
    }

    #[test]
    fn decodes_scalar_fields() {
        let r = registry();
        let d = doc(vec![block("urn:x:1", &[("rdfs:label", lit("Temperature"))])]);
        let out = Decoder::new(&r, &MapperConfig::default()).decode(&d).unwrap();
        assert_eq!(
            out,
            vec![EntityInstance::new("Sensor")
                .with("id", "urn:x:1")
                .with("label", "Temperature")]
        );
    }

    #[test]
    fn accepts_expanded_predicates_and_types() {
        let r = registry();
        let mut b = SubjectBlock::new("urn:x:1");
        b.push(RDF_TYPE, iri("https://streampipes.org/vocabulary/v1/Sensor"));
        b.push("http://www.w3.org/2000/01/rdf-schema#label", lit("T"));
        let out = Decoder::new(&r, &MapperConfig::default())
            .decode(&doc(vec![b]))
            .unwrap();
        assert_eq!(out[0].get_str("label"), Some("T"));
    }

    #[test]
    fn multi_values_keep_document_order() {
        let r = registry();
        let d = doc(vec![block(
            "urn:x:1",
            &[("sp:tag", lit("z")), ("rdfs:label", lit("L")), ("sp:tag", lit("a"))],
        )]);
        let out = Decoder::new(&r, &MapperConfig::default()).decode(&d).unwrap();
        assert_eq!(
            out[0].get("tags"),
            Some(&FieldValue::StrList(vec!["z".into(), "a".into()]))
        );
    }

    #[test]
    fn single_field_with_two_values_fails() {
        let r = registry();
        let d = doc(vec![block(
            "urn:x:1",
            &[("rdfs:label", lit("a")), ("rdfs:label", lit("b"))],
        )]);
        let err = Decoder::new(&r, &MapperConfig::default())
            .decode(&d)
            .unwrap_err();
        assert!(matches!(
            err,
            MapperError::CardinalityViolation { ref field, count: 2, .. } if field == "label"
        ));
    }

    #[test]
    fn unknown_and_missing_types_fail() {
        let r = registry();
        let mut b = SubjectBlock::new("urn:x:1");
        b.push_type("sp:Nothing");
        let err = Decoder::new(&r, &MapperConfig::default())
            .decode(&doc(vec![b]))
            .unwrap_err();
        assert_eq!(
            err,
            MapperError::UnknownSemanticType {
                subject: "urn:x:1".into(),
                type_tag: "sp:Nothing".into()
            }
        );

        let untyped = SubjectBlock::new("urn:x:2");
        let err = Decoder::new(&r, &MapperConfig::default())
            .decode(&doc(vec![untyped]))
            .unwrap_err();
        assert!(matches!(err, MapperError::MissingSemanticType { .. }));
    }

    #[test]
    fn unmapped_predicate_lenient_vs_strict() {
        let r = registry();
        let d = doc(vec![block(
            "urn:x:1",
            &[("sp:futureField", lit("x")), ("rdfs:label", lit("L"))],
        )]);

        let lenient = Decoder::new(&r, &MapperConfig::default()).decode(&d).unwrap();
        assert_eq!(lenient[0].fields().count(), 2);

        let err = Decoder::new(&r, &MapperConfig::strict())
            .decode(&d)
            .unwrap_err();
        assert!(matches!(
            err,
            MapperError::UnmappedPredicate { ref predicate, .. } if predicate == "sp:futureField"
        ));
    }

    #[test]
    fn nested_subjects_are_decoded_in_place() {
        let r = registry();
        let d = doc(vec![
            block("urn:p", &[("sp:hasPart", iri("urn:c1")), ("sp:hasPart", iri("urn:c2"))]),
            block("urn:c2", &[("rdfs:label", lit("two"))]),
            block("urn:c1", &[("rdfs:label", lit("one"))]),
        ]);
        let out = Decoder::new(&r, &MapperConfig::default()).decode(&d).unwrap();
        assert_eq!(out.len(), 1);
        let Some(FieldValue::EntityList(parts)) = out[0].get("parts") else {
            panic!("parts missing: {:?}", out[0]);
        };
        let labels: Vec<_> = parts.iter().filter_map(|p| p.get_str("label")).collect();
        assert_eq!(labels, ["one", "two"]);
    }

    #[test]
    fn cycles_are_rejected() {
        let r = registry();
        let d = doc(vec![
            block("urn:a", &[("sp:parent", iri("urn:b"))]),
            block("urn:b", &[("sp:parent", iri("urn:a"))]),
        ]);
        let err = Decoder::new(&r, &MapperConfig::default())
            .decode(&d)
            .unwrap_err();
        assert!(matches!(err, MapperError::CyclicReference { .. }), "{err:?}");
    }

    #[test]
    fn self_reference_is_rejected() {
        let r = registry();
        let d = doc(vec![
            block("urn:root", &[("sp:hasPart", iri("urn:a"))]),
            block("urn:a", &[("sp:hasPart", iri("urn:a"))]),
        ]);
        let err = Decoder::new(&r, &MapperConfig::default())
            .decode(&d)
            .unwrap_err();
        assert_eq!(
            err,
            MapperError::CyclicReference {
                subject: "urn:a".into(),
                path: vec!["urn:root".into(), "urn:a".into()],
            }
        );
    }

    /// Each link references the next subject twice.
    fn doubling_chain(len: usize) -> Document {
        let blocks = (0..len)
            .map(|i| {
                let next = iri(&format!("urn:{}", i + 1));
                if i + 1 == len {
                    block(&format!("urn:{i}"), &[])
                } else {
                    block(
                        &format!("urn:{i}"),
                        &[("sp:hasPart", next.clone()), ("sp:hasPart", next)],
                    )
                }
            })
            .collect();
        doc(blocks)
    }

    #[test]
    fn shared_references_are_built_per_reference() {
        let r = registry();
        let roots = Decoder::new(&r, &MapperConfig::default())
            .decode(&doubling_chain(3))
            .unwrap();
        let leaf = EntityInstance::new("Sensor").with("id", "urn:2");
        let middle = EntityInstance::new("Sensor")
            .with("id", "urn:1")
            .with("parts", vec![leaf.clone(), leaf]);
        let root = EntityInstance::new("Sensor")
            .with("id", "urn:0")
            .with("parts", vec![middle.clone(), middle]);
        assert_eq!(roots, vec![root]);
    }

    #[test]
    fn node_budget_stops_exponential_expansion() {
        let r = registry();
        let err = Decoder::new(&r, &MapperConfig::default())
            .decode(&doubling_chain(30))
            .unwrap_err();
        assert!(
            matches!(err, MapperError::NodeLimitExceeded { limit: DEFAULT_MAX_NODES, .. }),
            "{err:?}"
        );

        let tight = MapperConfig {
            max_nodes: 6,
            ..MapperConfig::default()
        };
        let err = Decoder::new(&r, &tight)
            .decode(&doubling_chain(3))
            .unwrap_err();
        assert!(matches!(err, MapperError::NodeLimitExceeded { limit: 6, .. }));
        let enough = MapperConfig {
            max_nodes: 7,
            ..MapperConfig::default()
        };
        assert!(Decoder::new(&r, &enough).decode(&doubling_chain(3)).is_ok());
    }

    #[test]
    fn depth_limit_applies_before_cycle_check() {
        let r = registry();
        let d = doc(vec![
            block("urn:0", &[("sp:parent", iri("urn:1"))]),
            block("urn:1", &[("sp:parent", iri("urn:2"))]),
            block("urn:2", &[("sp:parent", iri("urn:3"))]),
            block("urn:3", &[("rdfs:label", lit("leaf"))]),
        ]);
        let shallow = MapperConfig {
            max_depth: 2,
            ..MapperConfig::default()
        };
        let err = Decoder::new(&r, &shallow).decode(&d).unwrap_err();
        assert!(matches!(err, MapperError::MaxDepthExceeded { limit: 2, .. }));
        assert!(Decoder::new(&r, &MapperConfig::default()).decode(&d).is_ok());
    }

    #[test]
    fn unresolved_reference_lenient_vs_strict() {
        let r = registry();
        let d = doc(vec![block("urn:p", &[("sp:parent", iri("urn:elsewhere"))])]);
        let out = Decoder::new(&r, &MapperConfig::default()).decode(&d).unwrap();
        assert!(out[0].get("parent").is_none());

        let err = Decoder::new(&r, &MapperConfig::strict())
            .decode(&d)
            .unwrap_err();
        assert!(matches!(err, MapperError::UnresolvedReference { .. }));
    }

    #[test]
    fn literal_on_entity_field_fails() {
        let r = registry();
        let d = doc(vec![block("urn:p", &[("sp:parent", lit("urn:q"))])]);
        let err = Decoder::new(&r, &MapperConfig::default())
            .decode(&d)
            .unwrap_err();
        assert!(matches!(err, MapperError::ObjectMismatch { .. }));
    }

    #[test]
    fn iri_on_literal_field_keeps_the_iri() {
        let r = registry();
        let d = doc(vec![block("urn:p", &[("rdfs:label", iri("urn:label"))])]);
        let out = Decoder::new(&r, &MapperConfig::default()).decode(&d).unwrap();
        assert_eq!(out[0].get_str("label"), Some("urn:label"));
    }

    #[test]
    fn duplicate_subject_blocks_fail() {
        let r = registry();
        let d = doc(vec![
            block("urn:x:1", &[("rdfs:label", lit("a"))]),
            block("urn:x:1", &[("rdfs:label", lit("b"))]),
        ]);
        let err = Decoder::new(&r, &MapperConfig::default())
            .decode(&d)
            .unwrap_err();
        assert_eq!(
            err,
            MapperError::DuplicateIdentity {
                subject: "urn:x:1".into()
            }
        );
    }

    #[test]
    fn decode_subject_picks_one_entity() {
        let r = registry();
        let e = EntityInstance::new("Sensor")
            .with("id", "urn:p")
            .with("parent", EntityInstance::new("Sensor").with("id", "urn:q"));
        let d = Encoder::new(&r, &MapperConfig::default()).encode(&e).unwrap();
        let decoder = Decoder::new(&r, &MapperConfig::default());
        let q = decoder.decode_subject(&d, "urn:q").unwrap().unwrap();
        assert_eq!(q.get_str("id"), Some("urn:q"));
        assert!(decoder.decode_subject(&d, "urn:none").unwrap().is_none());
    }
}
