//! Runtime entity instances.
//!
//! An [`EntityInstance`] is the untyped form every entity takes on its way to
//! and from a [`Document`](crate::document::Document): a class identity plus a
//! map of field name to [`FieldValue`]. The identity field is stored under its
//! own name like any other field.

use std::collections::BTreeMap;

/// The value of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// A single string.
    Str(String),
    /// An ordered string sequence.
    StrList(Vec<String>),
    /// A nested entity.
    Entity(Box<EntityInstance>),
    /// An ordered sequence of nested entities.
    EntityList(Vec<EntityInstance>),
}

impl FieldValue {
    /// Returns the string for [`FieldValue::Str`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    fn is_empty_sequence(&self) -> bool {
        match self {
            FieldValue::StrList(items) => items.is_empty(),
            FieldValue::EntityList(items) => items.is_empty(),
            FieldValue::Str(_) | FieldValue::Entity(_) => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        FieldValue::StrList(items)
    }
}

impl From<EntityInstance> for FieldValue {
    fn from(entity: EntityInstance) -> Self {
        FieldValue::Entity(Box::new(entity))
    }
}

impl From<Vec<EntityInstance>> for FieldValue {
    fn from(items: Vec<EntityInstance>) -> Self {
        FieldValue::EntityList(items)
    }
}

/// An entity of a registered class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityInstance {
    class: String,
    fields: BTreeMap<String, FieldValue>,
}

impl EntityInstance {
    /// Creates an instance of `class` with no fields set.
    #[must_use]
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder form of [`EntityInstance::set`].
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    /// The class identity used to look up the descriptor.
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Sets a field. An empty sequence is equivalent to an unset field and
    /// removes it.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        let field = field.into();
        let value = value.into();
        if value.is_empty_sequence() {
            self.fields.remove(&field);
        } else {
            self.fields.insert(field, value);
        }
    }

    /// Removes a field, returning its previous value.
    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.fields.remove(field)
    }

    /// Returns a field's value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Returns a field's value when it is a single string.
    #[must_use]
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_str)
    }

    /// Iterates the set fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}
