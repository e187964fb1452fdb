//! Typed StreamPipes entities.
//!
//! Each type implements [`Entity`]: it declares its field mappings once
//! through [`Entity::register`] and converts to and from the untyped
//! [`EntityInstance`] the encoder and decoder work on. Class families are
//! closed enums dispatched on the instance's class identity:
//!
//! | Family | Variants |
//! |--------|----------|
//! | [`StaticProperty`] | mapping (n-ary, unary), free text |
//! | [`TransformationRule`] | add nested, rename, delete |
//! | [`EventProperty`] | primitive, nested, list |
//!
//! plus the standalone [`EventSchema`], [`DataSetDescription`] and
//! [`PipelineTemplateInvocation`].

pub mod event_property;
pub mod pipeline;
pub mod static_property;
pub mod transformation_rule;

pub use event_property::{
    EventProperty, EventPropertyList, EventPropertyNested, EventPropertyPrimitive, EventSchema,
};
pub use pipeline::{DataSetDescription, PipelineTemplateInvocation};
pub use static_property::{
    FreeTextStaticProperty, MappingPropertyNary, MappingPropertyUnary, StaticProperty,
    StaticPropertyInfo,
};
pub use transformation_rule::{AddNestedRule, DeleteRule, RenameRule, TransformationRule};

use crate::error::{MapperError, Result};
use crate::instance::{EntityInstance, FieldValue};
use crate::registry::Registry;

/// A Rust type with a registered entity mapping.
pub trait Entity: Sized {
    /// Declares the type's classes and field mappings.
    ///
    /// # Errors
    ///
    /// Returns the registry error if a declaration conflicts.
    fn register(registry: &mut Registry) -> Result<()>;

    /// Converts to the untyped form.
    fn to_instance(&self) -> EntityInstance;

    /// Converts from the untyped form.
    ///
    /// # Errors
    ///
    /// [`MapperError::FieldType`] if the instance belongs to another class or
    /// a field is missing or wrongly shaped.
    fn from_instance(instance: &EntityInstance) -> Result<Self>;
}

/// Registers every built-in StreamPipes class.
///
/// # Errors
///
/// Returns the registry error if a declaration conflicts with an existing one.
pub fn register_all(registry: &mut Registry) -> Result<()> {
    StaticProperty::register(registry)?;
    TransformationRule::register(registry)?;
    EventProperty::register(registry)?;
    EventSchema::register(registry)?;
    DataSetDescription::register(registry)?;
    PipelineTemplateInvocation::register(registry)?;
    Ok(())
}

/// Generates a fresh identity under `namespace` using a random UUID.
///
/// ```
/// let id = sp_mapper::model::generate_id("urn:streampipes.org:spi:eventproperty:");
/// assert!(id.starts_with("urn:streampipes.org:spi:eventproperty:"));
/// ```
#[must_use]
pub fn generate_id(namespace: &str) -> String {
    format!("{namespace}{}", uuid::Uuid::new_v4())
}

/// Field-by-field reader over an instance of one expected class.
pub(crate) struct Fields<'a> {
    class: &'static str,
    instance: &'a EntityInstance,
}

impl<'a> Fields<'a> {
    pub(crate) fn of(class: &'static str, instance: &'a EntityInstance) -> Result<Self> {
        if instance.class() != class {
            return Err(MapperError::FieldType {
                class: class.to_owned(),
                field: String::new(),
                reason: "belongs to an instance of another class",
            });
        }
        Ok(Self { class, instance })
    }

    fn error(&self, field: &str, reason: &'static str) -> MapperError {
        MapperError::FieldType {
            class: self.class.to_owned(),
            field: field.to_owned(),
            reason,
        }
    }

    pub(crate) fn required(&self, field: &str) -> Result<String> {
        self.optional(field)?
            .ok_or_else(|| self.error(field, "is missing"))
    }

    pub(crate) fn optional(&self, field: &str) -> Result<Option<String>> {
        match self.instance.get(field) {
            None => Ok(None),
            Some(FieldValue::Str(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.error(field, "is not a single string")),
        }
    }

    pub(crate) fn list(&self, field: &str) -> Result<Vec<String>> {
        match self.instance.get(field) {
            None => Ok(Vec::new()),
            Some(FieldValue::StrList(items)) => Ok(items.clone()),
            Some(_) => Err(self.error(field, "is not a string sequence")),
        }
    }

    pub(crate) fn entity<T: Entity>(&self, field: &str) -> Result<Option<T>> {
        match self.instance.get(field) {
            None => Ok(None),
            Some(FieldValue::Entity(e)) => T::from_instance(e).map(Some),
            Some(_) => Err(self.error(field, "is not a nested entity")),
        }
    }

    pub(crate) fn entities<T: Entity>(&self, field: &str) -> Result<Vec<T>> {
        match self.instance.get(field) {
            None => Ok(Vec::new()),
            Some(FieldValue::EntityList(items)) => items.iter().map(T::from_instance).collect(),
            Some(_) => Err(self.error(field, "is not a nested entity sequence")),
        }
    }
}

/// Sets `field` only when `value` is present.
pub(crate) fn set_opt(instance: &mut EntityInstance, field: &str, value: Option<&String>) {
    if let Some(value) = value {
        instance.set(field, value.as_str());
    }
}

/// Converts a slice of typed entities into an instance sequence.
pub(crate) fn instances<T: Entity>(items: &[T]) -> Vec<EntityInstance> {
    items.iter().map(T::to_instance).collect()
}
