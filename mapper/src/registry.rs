//! Entity class descriptor registry.
//!
//! A [`Registry`] records, per entity class, its semantic type tag and the
//! ordered list of field mappings declared on it. Registration is the only way
//! mappings enter the system; there is no schema file.
//!
//! Ad-hoc registries are plain values mutated through `&mut self`, so writers
//! are exclusive by construction. The process-wide registry returned by
//! [`Registry::global`] is built once on first use and only read afterwards.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use tracing::debug;

use crate::context::Context;
use crate::error::{MapperError, Result};

/// Whether a field holds one value or an ordered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    /// At most one value.
    Single,
    /// Ordered sequence of values.
    Multi,
}

/// What kind of object a predicate field points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Range {
    /// A literal string.
    Literal,
    /// Another entity, serialized as its own subject block.
    Entity,
}

/// How a field maps onto the external representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingKind {
    /// The field holds the entity's subject IRI.
    Identity,
    /// The field maps to a predicate.
    Predicate {
        /// Predicate IRI or CURIE, as registered.
        iri: String,
        /// Object kind.
        range: Range,
    },
}

/// One registered field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name on the entity.
    pub name: String,
    /// Identity marker or predicate mapping.
    pub kind: MappingKind,
    /// Single or multi-valued.
    pub multiplicity: Multiplicity,
    expanded: Option<String>,
}

impl FieldDescriptor {
    /// Returns `true` for the identity field.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.kind == MappingKind::Identity
    }

    /// Returns the predicate as registered, or `None` for the identity field.
    #[must_use]
    pub fn predicate(&self) -> Option<&str> {
        match &self.kind {
            MappingKind::Identity => None,
            MappingKind::Predicate { iri, .. } => Some(iri),
        }
    }

    /// Returns the predicate expanded against the registry context.
    #[must_use]
    pub fn expanded_predicate(&self) -> Option<&str> {
        self.expanded.as_deref()
    }

    /// Returns the object range, or `None` for the identity field.
    #[must_use]
    pub fn range(&self) -> Option<Range> {
        match &self.kind {
            MappingKind::Identity => None,
            MappingKind::Predicate { range, .. } => Some(*range),
        }
    }
}

/// The full description of one entity class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDescriptor {
    /// Class identity (e.g. `"MappingPropertyNary"`).
    pub class: String,
    /// Semantic type tag as registered (e.g. `"sp:MappingPropertyNary"`).
    pub type_tag: String,
    /// Field mappings in registration order.
    pub fields: Vec<FieldDescriptor>,
}

impl ClassDescriptor {
    /// Returns the identity field, if one has been declared.
    #[must_use]
    pub fn identity_field(&self) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.is_identity())
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Looks up the field mapped to an already expanded predicate IRI.
    #[must_use]
    pub fn field_for_predicate(&self, expanded: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|f| f.expanded.as_deref() == Some(expanded))
    }

    /// Iterates the predicate-mapped fields in registration order.
    pub fn predicate_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| !f.is_identity())
    }
}

/// Registry of entity class descriptors.
#[derive(Debug, Clone)]
pub struct Registry {
    context: Context,
    classes: BTreeMap<String, ClassDescriptor>,
    by_tag: HashMap<String, String>,
}

impl Registry {
    /// Creates an empty registry that resolves CURIEs through `context`.
    #[must_use]
    pub fn new(context: Context) -> Self {
        Self {
            context,
            classes: BTreeMap::new(),
            by_tag: HashMap::new(),
        }
    }

    /// Creates a registry holding every built-in StreamPipes model class.
    ///
    /// # Errors
    ///
    /// Returns an error only if the built-in declarations conflict.
    pub fn with_model(context: Context) -> Result<Self> {
        let mut registry = Self::new(context);
        crate::model::register_all(&mut registry)?;
        Ok(registry)
    }

    /// Returns the process-wide registry with the built-in StreamPipes model
    /// and the default context. It is built on first call and never mutated.
    ///
    /// # Errors
    ///
    /// Returns the registration error if the built-in declarations conflict.
    pub fn global() -> Result<&'static Registry> {
        static GLOBAL: OnceLock<Result<Registry>> = OnceLock::new();
        match GLOBAL.get_or_init(|| Registry::with_model(Context::streampipes())) {
            Ok(registry) => Ok(registry),
            Err(e) => Err(e.clone()),
        }
    }

    /// The context used to expand predicates and type tags.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Records the semantic type tag of `class`.
    ///
    /// Registering the same class with the same tag again is a no-op.
    ///
    /// # Errors
    ///
    /// [`MapperError::DuplicateRegistration`] if the class already has a
    /// different tag, or the tag already belongs to another class.
    pub fn register_class(&mut self, class: &str, type_tag: &str) -> Result<()> {
        if let Some(existing) = self.classes.get(class) {
            if existing.type_tag == type_tag {
                return Ok(());
            }
            return Err(MapperError::DuplicateRegistration {
                class: class.to_owned(),
                existing: existing.type_tag.clone(),
                requested: type_tag.to_owned(),
            });
        }
        let expanded = self.context.expand(type_tag);
        if let Some(owner) = self.by_tag.get(&expanded) {
            return Err(MapperError::DuplicateRegistration {
                class: class.to_owned(),
                existing: format!("{type_tag} (owned by `{owner}`)"),
                requested: type_tag.to_owned(),
            });
        }
        debug!(class, type_tag, "registered entity class");
        self.by_tag.insert(expanded, class.to_owned());
        self.classes.insert(
            class.to_owned(),
            ClassDescriptor {
                class: class.to_owned(),
                type_tag: type_tag.to_owned(),
                fields: Vec::new(),
            },
        );
        Ok(())
    }

    /// Records one field mapping of `class`.
    ///
    /// Re-registering an identical mapping is a no-op.
    ///
    /// # Errors
    ///
    /// - [`MapperError::UnknownClass`] if `class` was never registered.
    /// - [`MapperError::MultipleIdentityFields`] on a second identity field.
    /// - [`MapperError::DuplicateField`] if `field` is already mapped
    ///   differently, or its predicate is already used by another field.
    pub fn register_field(
        &mut self,
        class: &str,
        field: &str,
        kind: MappingKind,
        multiplicity: Multiplicity,
    ) -> Result<()> {
        let expanded = match &kind {
            MappingKind::Identity => None,
            MappingKind::Predicate { iri, .. } => Some(self.context.expand(iri)),
        };
        let descriptor = self
            .classes
            .get_mut(class)
            .ok_or_else(|| MapperError::UnknownClass {
                class: class.to_owned(),
            })?;

        if let Some(existing) = descriptor.field(field) {
            if existing.kind == kind && existing.multiplicity == multiplicity {
                return Ok(());
            }
            return Err(MapperError::DuplicateField {
                class: class.to_owned(),
                field: field.to_owned(),
            });
        }
        match &expanded {
            None => {
                if let Some(identity) = descriptor.identity_field() {
                    return Err(MapperError::MultipleIdentityFields {
                        class: class.to_owned(),
                        existing: identity.name.clone(),
                        field: field.to_owned(),
                    });
                }
            }
            Some(predicate) => {
                if let Some(other) = descriptor.field_for_predicate(predicate) {
                    return Err(MapperError::DuplicateField {
                        class: class.to_owned(),
                        field: other.name.clone(),
                    });
                }
            }
        }

        descriptor.fields.push(FieldDescriptor {
            name: field.to_owned(),
            kind,
            multiplicity,
            expanded,
        });
        Ok(())
    }

    /// Starts a chained declaration of `class`.
    ///
    /// ```
    /// use sp_mapper::{Context, Registry};
    ///
    /// let mut registry = Registry::new(Context::streampipes());
    /// registry
    ///     .define("Sensor", "sp:Sensor")?
    ///     .identity("id")?
    ///     .literal("label", "rdfs:label")?;
    /// assert_eq!(registry.describe("Sensor")?.fields.len(), 2);
    /// # Ok::<(), sp_mapper::MapperError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Same as [`Registry::register_class`].
    pub fn define(&mut self, class: &str, type_tag: &str) -> Result<ClassBuilder<'_>> {
        self.register_class(class, type_tag)?;
        Ok(ClassBuilder {
            registry: self,
            class: class.to_owned(),
        })
    }

    /// Returns the descriptor of `class`.
    ///
    /// # Errors
    ///
    /// [`MapperError::UnknownClass`] if `class` was never registered.
    pub fn describe(&self, class: &str) -> Result<&ClassDescriptor> {
        self.classes
            .get(class)
            .ok_or_else(|| MapperError::UnknownClass {
                class: class.to_owned(),
            })
    }

    /// Looks up the class owning a semantic type tag (CURIE or absolute IRI).
    #[must_use]
    pub fn class_for_tag(&self, type_tag: &str) -> Option<&ClassDescriptor> {
        let expanded = self.context.expand(type_tag);
        self.by_tag
            .get(&expanded)
            .and_then(|class| self.classes.get(class))
    }

    /// Iterates all descriptors ordered by class name.
    pub fn classes(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes.values()
    }

    /// Number of registered classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` if no class is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Context::streampipes())
    }
}

/// Chained field declarations for one class, see [`Registry::define`].
pub struct ClassBuilder<'a> {
    registry: &'a mut Registry,
    class: String,
}

impl ClassBuilder<'_> {
    fn add(
        &mut self,
        field: &str,
        kind: MappingKind,
        multiplicity: Multiplicity,
    ) -> Result<&mut Self> {
        self.registry
            .register_field(&self.class, field, kind, multiplicity)?;
        Ok(self)
    }

    fn predicate(
        &mut self,
        field: &str,
        iri: &str,
        range: Range,
        multiplicity: Multiplicity,
    ) -> Result<&mut Self> {
        let kind = MappingKind::Predicate {
            iri: iri.to_owned(),
            range,
        };
        self.add(field, kind, multiplicity)
    }

    /// Declares the identity field.
    ///
    /// # Errors
    ///
    /// See [`Registry::register_field`].
    pub fn identity(&mut self, field: &str) -> Result<&mut Self> {
        self.add(field, MappingKind::Identity, Multiplicity::Single)
    }

    /// Declares a single-valued literal field.
    ///
    /// # Errors
    ///
    /// See [`Registry::register_field`].
    pub fn literal(&mut self, field: &str, iri: &str) -> Result<&mut Self> {
        self.predicate(field, iri, Range::Literal, Multiplicity::Single)
    }

    /// Declares a multi-valued literal field.
    ///
    /// # Errors
    ///
    /// See [`Registry::register_field`].
    pub fn literals(&mut self, field: &str, iri: &str) -> Result<&mut Self> {
        self.predicate(field, iri, Range::Literal, Multiplicity::Multi)
    }

    /// Declares a single nested-entity field.
    ///
    /// # Errors
    ///
    /// See [`Registry::register_field`].
    pub fn entity(&mut self, field: &str, iri: &str) -> Result<&mut Self> {
        self.predicate(field, iri, Range::Entity, Multiplicity::Single)
    }

    /// Declares a multi-valued nested-entity field.
    ///
    /// # Errors
    ///
    /// See [`Registry::register_field`].
    pub fn entities(&mut self, field: &str, iri: &str) -> Result<&mut Self> {
        self.predicate(field, iri, Range::Entity, Multiplicity::Multi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        Registry::new(Context::streampipes())
    }

    #[test]
    fn register_class_is_idempotent_for_same_tag() {
        let mut r = registry();
        r.register_class("Sensor", "sp:Sensor").unwrap();
        r.register_class("Sensor", "sp:Sensor").unwrap();
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn register_class_rejects_different_tag() {
        let mut r = registry();
        r.register_class("Sensor", "sp:Sensor").unwrap();
        let err = r.register_class("Sensor", "sp:Other").unwrap_err();
        assert!(matches!(err, MapperError::DuplicateRegistration { .. }));
    }

    #[test]
    fn register_class_rejects_tag_owned_by_other_class() {
        let mut r = registry();
        r.register_class("Sensor", "sp:Sensor").unwrap();
        // Same tag spelled as an absolute IRI.
        let err = r
            .register_class("Other", "https://streampipes.org/vocabulary/v1/Sensor")
            .unwrap_err();
        assert!(matches!(err, MapperError::DuplicateRegistration { .. }));
    }

    #[test]
    fn second_identity_field_is_rejected() {
        let mut r = registry();
        r.define("Sensor", "sp:Sensor").unwrap().identity("id").unwrap();
        let err = r
            .register_field("Sensor", "uri", MappingKind::Identity, Multiplicity::Single)
            .unwrap_err();
        assert_eq!(
            err,
            MapperError::MultipleIdentityFields {
                class: "Sensor".into(),
                existing: "id".into(),
                field: "uri".into(),
            }
        );
    }

    #[test]
    fn field_on_unknown_class_is_rejected() {
        let mut r = registry();
        let err = r
            .register_field("Ghost", "id", MappingKind::Identity, Multiplicity::Single)
            .unwrap_err();
        assert!(matches!(err, MapperError::UnknownClass { .. }));
    }

    #[test]
    fn identical_field_registration_is_a_no_op() {
        let mut r = registry();
        r.define("Sensor", "sp:Sensor")
            .unwrap()
            .literal("label", "rdfs:label")
            .unwrap()
            .literal("label", "rdfs:label")
            .unwrap();
        assert_eq!(r.describe("Sensor").unwrap().fields.len(), 1);
    }

    #[test]
    fn conflicting_field_registration_is_rejected() {
        let mut r = registry();
        r.define("Sensor", "sp:Sensor")
            .unwrap()
            .literal("label", "rdfs:label")
            .unwrap();
        let err = r
            .define("Sensor", "sp:Sensor")
            .unwrap()
            .literals("label", "rdfs:label")
            .err();
        assert!(matches!(err, Some(MapperError::DuplicateField { .. })));
    }

    #[test]
    fn describe_keeps_registration_order() {
        let mut r = registry();
        r.define("Sensor", "sp:Sensor")
            .unwrap()
            .identity("id")
            .unwrap()
            .literal("label", "rdfs:label")
            .unwrap()
            .literals("tags", "sp:tag")
            .unwrap();
        let d = r.describe("Sensor").unwrap();
        let names: Vec<_> = d.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["id", "label", "tags"]);
        assert_eq!(d.identity_field().map(|f| f.name.as_str()), Some("id"));
    }

    #[test]
    fn describe_unknown_class_fails() {
        let r = registry();
        assert_eq!(
            r.describe("Nope").unwrap_err(),
            MapperError::UnknownClass {
                class: "Nope".into()
            }
        );
    }

    #[test]
    fn predicate_lookup_accepts_both_spellings() {
        let mut r = registry();
        r.define("Sensor", "sp:Sensor")
            .unwrap()
            .literal("label", "rdfs:label")
            .unwrap();
        let d = r.class_for_tag("https://streampipes.org/vocabulary/v1/Sensor").unwrap();
        let expanded = r.context().expand("rdfs:label");
        assert_eq!(d.field_for_predicate(&expanded).unwrap().name, "label");
    }

    #[test]
    fn global_registry_contains_model() {
        let r = Registry::global().unwrap();
        assert!(r.describe("MappingPropertyNary").is_ok());
        assert!(r.class_for_tag("sp:CreateNestedRuleDescription").is_some());
        for class in r.classes() {
            assert!(
                class.identity_field().is_some(),
                "{} has no identity field",
                class.class
            );
        }
    }
}
