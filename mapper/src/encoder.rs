//! Entity instance → [`Document`].
//!
//! Every instance becomes one subject block: an `rdf:type` pair carrying the
//! class's semantic type tag, then one pair per mapped value in field
//! registration order. Nested entities get their own blocks, emitted after
//! their parent, and are linked by IRI. Fields without a mapping never leave
//! the instance.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::config::MapperConfig;
use crate::document::{Document, Object, SubjectBlock};
use crate::error::{MapperError, Result};
use crate::instance::{EntityInstance, FieldValue};
use crate::registry::{ClassDescriptor, FieldDescriptor, Multiplicity, Range, Registry};

/// Encodes entity instances against a registry.
#[derive(Debug, Clone, Copy)]
pub struct Encoder<'r> {
    registry: &'r Registry,
    max_depth: usize,
}

impl<'r> Encoder<'r> {
    /// Creates an encoder using `config.max_depth`.
    #[must_use]
    pub fn new(registry: &'r Registry, config: &MapperConfig) -> Self {
        Self {
            registry,
            max_depth: config.max_depth,
        }
    }

    /// Encodes one instance and everything nested in it.
    ///
    /// # Errors
    ///
    /// - [`MapperError::UnknownClass`] for an unregistered class.
    /// - [`MapperError::MissingIdentity`] for an absent or empty identity.
    /// - [`MapperError::CardinalityViolation`] for a sequence on a
    ///   single-valued field.
    /// - [`MapperError::ObjectMismatch`] for a value of the wrong range, a
    ///   scalar on a multi-valued field, or a one-element sequence on a
    ///   single-valued field.
    /// - [`MapperError::DuplicateIdentity`] if two different entities share
    ///   a subject.
    /// - [`MapperError::MaxDepthExceeded`] past the configured depth.
    pub fn encode(&self, entity: &EntityInstance) -> Result<Document> {
        self.encode_all(std::iter::once(entity))
    }

    /// Encodes several instances into one document.
    ///
    /// A subject produced twice with identical content is emitted once, so
    /// shared nested entities are allowed; different content under the same
    /// subject fails with [`MapperError::DuplicateIdentity`].
    ///
    /// # Errors
    ///
    /// See [`Encoder::encode`].
    pub fn encode_all<'a>(
        &self,
        entities: impl IntoIterator<Item = &'a EntityInstance>,
    ) -> Result<Document> {
        let mut out = Output::default();
        for entity in entities {
            self.encode_into(entity, 0, &mut out)?;
        }
        debug!(
            subjects = out.document.blocks.len(),
            triples = out.document.triple_count(),
            "encoded document"
        );
        Ok(out.document)
    }

    fn encode_into(&self, entity: &EntityInstance, depth: usize, out: &mut Output) -> Result<()> {
        let descriptor = self.registry.describe(entity.class())?;
        let subject = subject_of(descriptor, entity)?;
        if depth > self.max_depth {
            return Err(MapperError::MaxDepthExceeded {
                subject: subject.to_owned(),
                limit: self.max_depth,
            });
        }

        for (name, _) in entity.fields() {
            if descriptor.field(name).is_none() {
                trace!(class = %descriptor.class, field = name, "skipping unmapped field");
            }
        }

        let mut block = SubjectBlock::new(subject);
        block.push_type(descriptor.type_tag.clone());
        let mut nested: Vec<&EntityInstance> = Vec::new();

        for field in descriptor.predicate_fields() {
            let (Some(predicate), Some(range)) = (field.predicate(), field.range()) else {
                continue;
            };
            let Some(value) = entity.get(&field.name) else {
                continue;
            };
            match range {
                Range::Literal => {
                    for literal in literals(subject, field, value)? {
                        block.push(predicate, Object::Literal(literal.to_owned()));
                    }
                }
                Range::Entity => {
                    for child in children(subject, field, value)? {
                        let child_descriptor = self.registry.describe(child.class())?;
                        let child_subject = subject_of(child_descriptor, child)?;
                        block.push(predicate, Object::Iri(child_subject.to_owned()));
                        nested.push(child);
                    }
                }
            }
        }

        if out.insert(block)? {
            for child in nested {
                self.encode_into(child, depth + 1, out)?;
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct Output {
    document: Document,
    index: HashMap<String, usize>,
}

impl Output {
    /// Returns `false` when an identical block was already present.
    fn insert(&mut self, block: SubjectBlock) -> Result<bool> {
        if let Some(&i) = self.index.get(&block.subject) {
            if self.document.blocks[i] == block {
                return Ok(false);
            }
            return Err(MapperError::DuplicateIdentity {
                subject: block.subject,
            });
        }
        self.index
            .insert(block.subject.clone(), self.document.blocks.len());
        self.document.push(block);
        Ok(true)
    }
}

fn subject_of<'e>(descriptor: &ClassDescriptor, entity: &'e EntityInstance) -> Result<&'e str> {
    let missing = |field: &str| MapperError::MissingIdentity {
        class: descriptor.class.clone(),
        field: field.to_owned(),
    };
    let identity = descriptor.identity_field().ok_or_else(|| missing(""))?;
    match entity.get_str(&identity.name) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(missing(&identity.name)),
    }
}

fn literals<'v>(
    subject: &str,
    field: &FieldDescriptor,
    value: &'v FieldValue,
) -> Result<Vec<&'v str>> {
    match (value, field.multiplicity) {
        (FieldValue::Str(s), Multiplicity::Single) => Ok(vec![s.as_str()]),
        (FieldValue::StrList(items), Multiplicity::Multi) => {
            Ok(items.iter().map(String::as_str).collect())
        }
        (FieldValue::StrList(items), Multiplicity::Single) => {
            Err(shape_error(subject, field, items.len(), "a single literal value"))
        }
        (FieldValue::Str(_), Multiplicity::Multi) => {
            Err(mismatch(subject, field, "a sequence of literal values"))
        }
        (FieldValue::Entity(_) | FieldValue::EntityList(_), _) => {
            Err(mismatch(subject, field, "a literal value"))
        }
    }
}

fn children<'v>(
    subject: &str,
    field: &FieldDescriptor,
    value: &'v FieldValue,
) -> Result<Vec<&'v EntityInstance>> {
    match (value, field.multiplicity) {
        (FieldValue::Entity(e), Multiplicity::Single) => Ok(vec![e.as_ref()]),
        (FieldValue::EntityList(items), Multiplicity::Multi) => Ok(items.iter().collect()),
        (FieldValue::EntityList(items), Multiplicity::Single) => {
            Err(shape_error(subject, field, items.len(), "a single nested entity"))
        }
        (FieldValue::Entity(_), Multiplicity::Multi) => {
            Err(mismatch(subject, field, "a sequence of nested entities"))
        }
        (FieldValue::Str(_) | FieldValue::StrList(_), _) => {
            Err(mismatch(subject, field, "a nested entity"))
        }
    }
}

fn mismatch(subject: &str, field: &FieldDescriptor, expected: &'static str) -> MapperError {
    MapperError::ObjectMismatch {
        subject: subject.to_owned(),
        field: field.name.clone(),
        expected,
    }
}

/// A sequence on a single-valued field: several values break cardinality,
/// a single one only the shape.
fn shape_error(
    subject: &str,
    field: &FieldDescriptor,
    count: usize,
    expected: &'static str,
) -> MapperError {
    if count > 1 {
        return MapperError::CardinalityViolation {
            subject: subject.to_owned(),
            field: field.name.clone(),
            predicate: field.predicate().unwrap_or_default().to_owned(),
            count,
        };
    }
    mismatch(subject, field, expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::iris::RDF_TYPE;
    use crate::context::Context;

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
            .entities("parts", "sp:hasPart")
            .unwrap();
        r
    }

    fn encoder(r: &Registry) -> Encoder<'_> {
        Encoder::new(r, &MapperConfig::default())
    }

    #[test]
    fn emits_type_and_label() {
        let r = registry();
        let e = EntityInstance::new("Sensor")
            .with("id", "urn:x:1")
            .with("label", "Temperature");
        let doc = encoder(&r).encode(&e).unwrap();
        let triples: Vec<_> = doc
            .triples()
            .map(|t| (t.subject, t.predicate, t.object.clone()))
            .collect();
        assert_eq!(
            triples,
            vec![
                ("urn:x:1", RDF_TYPE, Object::Iri("sp:Sensor".into())),
                ("urn:x:1", "rdfs:label", Object::Literal("Temperature".into())),
            ]
        );
    }

    #[test]
    fn multi_values_keep_order() {
        let r = registry();
        let e = EntityInstance::new("Sensor")
            .with("id", "urn:x:1")
            .with("tags", vec!["b".to_owned(), "a".to_owned(), "c".to_owned()]);
        let doc = encoder(&r).encode(&e).unwrap();
        let tags: Vec<_> = doc
            .triples()
            .filter(|t| t.predicate == "sp:tag")
            .map(|t| t.object.as_str().to_owned())
            .collect();
        assert_eq!(tags, ["b", "a", "c"]);
    }

    #[test]
    fn unmapped_fields_are_skipped() {
        let r = registry();
        let e = EntityInstance::new("Sensor")
            .with("id", "urn:x:1")
            .with("selected", "true");
        let doc = encoder(&r).encode(&e).unwrap();
        assert_eq!(doc.triple_count(), 1);
        assert!(doc.triples().all(|t| t.object.as_str() != "true"));
    }

    #[test]
    fn missing_or_empty_identity_fails() {
        let r = registry();
        let err = encoder(&r)
            .encode(&EntityInstance::new("Sensor").with("label", "x"))
            .unwrap_err();
        assert!(matches!(err, MapperError::MissingIdentity { ref field, .. } if field == "id"));

        let err = encoder(&r)
            .encode(&EntityInstance::new("Sensor").with("id", ""))
            .unwrap_err();
        assert!(matches!(err, MapperError::MissingIdentity { .. }));
    }

    #[test]
    fn unknown_class_fails() {
        let r = registry();
        let err = encoder(&r)
            .encode(&EntityInstance::new("Ghost").with("id", "urn:g"))
            .unwrap_err();
        assert!(matches!(err, MapperError::UnknownClass { .. }));
    }

    #[test]
    fn sequence_on_single_field_fails() {
        let r = registry();
        let e = EntityInstance::new("Sensor")
            .with("id", "urn:x:1")
            .with("label", vec!["a".to_owned(), "b".to_owned()]);
        let err = encoder(&r).encode(&e).unwrap_err();
        assert!(matches!(err, MapperError::CardinalityViolation { count: 2, .. }));
    }

    #[test]
    fn value_shape_must_match_multiplicity() {
        let r = registry();
        let scalar_on_multi = EntityInstance::new("Sensor")
            .with("id", "urn:x:1")
            .with("tags", "only");
        let err = encoder(&r).encode(&scalar_on_multi).unwrap_err();
        assert!(matches!(err, MapperError::ObjectMismatch { ref field, .. } if field == "tags"));

        let list_on_single = EntityInstance::new("Sensor")
            .with("id", "urn:x:1")
            .with("label", vec!["one".to_owned()]);
        let err = encoder(&r).encode(&list_on_single).unwrap_err();
        assert!(matches!(err, MapperError::ObjectMismatch { ref field, .. } if field == "label"));

        let part = EntityInstance::new("Sensor").with("id", "urn:x:2");
        let entity_on_multi = EntityInstance::new("Sensor")
            .with("id", "urn:x:1")
            .with("parts", part);
        let err = encoder(&r).encode(&entity_on_multi).unwrap_err();
        assert!(matches!(err, MapperError::ObjectMismatch { ref field, .. } if field == "parts"));
    }

    #[test]
    fn wrong_range_fails() {
        let r = registry();
        let e = EntityInstance::new("Sensor")
            .with("id", "urn:x:1")
            .with("parts", "urn:not-an-entity");
        let err = encoder(&r).encode(&e).unwrap_err();
        assert!(matches!(err, MapperError::ObjectMismatch { .. }));
    }

    #[test]
    fn nested_entities_become_linked_blocks() {
        let r = registry();
        let part = EntityInstance::new("Sensor").with("id", "urn:x:2");
        let e = EntityInstance::new("Sensor")
            .with("id", "urn:x:1")
            .with("parts", vec![part]);
        let doc = encoder(&r).encode(&e).unwrap();
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.blocks[0].subject, "urn:x:1");
        assert!(doc.blocks[0]
            .pairs
            .contains(&("sp:hasPart".to_owned(), Object::Iri("urn:x:2".into()))));
        assert_eq!(doc.blocks[1].subject, "urn:x:2");
    }

    #[test]
    fn identical_duplicates_merge_and_different_ones_fail() {
        let r = registry();
        let a = EntityInstance::new("Sensor").with("id", "urn:x:1").with("label", "A");
        let doc = encoder(&r).encode_all([&a, &a.clone()]).unwrap();
        assert_eq!(doc.blocks.len(), 1);

        let b = EntityInstance::new("Sensor").with("id", "urn:x:1").with("label", "B");
        let err = encoder(&r).encode_all([&a, &b]).unwrap_err();
        assert_eq!(
            err,
            MapperError::DuplicateIdentity {
                subject: "urn:x:1".into()
            }
        );
    }

    #[test]
    fn depth_is_bounded() {
        let r = registry();
        let mut e = EntityInstance::new("Sensor").with("id", "urn:x:0");
        for i in 1..=3 {
            e = EntityInstance::new("Sensor")
                .with("id", format!("urn:x:{i}"))
                .with("parts", vec![e]);
        }
        let config = MapperConfig {
            max_depth: 2,
            ..MapperConfig::default()
        };
        let err = Encoder::new(&r, &config).encode(&e).unwrap_err();
        assert!(matches!(err, MapperError::MaxDepthExceeded { limit: 2, .. }));
        assert!(Encoder::new(&r, &MapperConfig::default()).encode(&e).is_ok());
    }
}
