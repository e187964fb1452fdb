//! Event schemas and the property tree edited in the schema editor.

use crate::error::{MapperError, Result};
use crate::instance::EntityInstance;
use crate::registry::{ClassBuilder, Registry};

use super::{generate_id, instances, set_opt, Entity, Fields};

const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
const RDFS_DESCRIPTION: &str = "http://www.w3.org/2000/01/rdf-schema#description";

fn declare_common(builder: &mut ClassBuilder<'_>) -> Result<()> {
    builder
        .identity("id")?
        .literal("runtimeName", "sp:hasRuntimeName")?
        .literal("label", RDFS_LABEL)?
        .literal("description", RDFS_DESCRIPTION)?;
    Ok(())
}

/// A leaf property carrying a runtime value (`sp:EventPropertyPrimitive`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPropertyPrimitive {
    /// Subject IRI.
    pub id: String,
    /// Key of the property in runtime events.
    pub runtime_name: Option<String>,
    /// Display label.
    pub label: Option<String>,
    /// Display description.
    pub description: Option<String>,
    /// XSD datatype of the runtime value.
    pub runtime_type: Option<String>,
    /// Semantic types of the value (e.g. `http://schema.org/Number`).
    pub domain_properties: Vec<String>,
}

impl EventPropertyPrimitive {
    /// Class identity.
    pub const CLASS: &'static str = "EventPropertyPrimitive";

    /// Creates a primitive with a fresh identity, as the schema editor does
    /// when the user adds a property.
    #[must_use]
    pub fn new(runtime_name: Option<String>) -> Self {
        Self {
            id: generate_id("urn:streampipes.org:spi:eventpropertyprimitive:"),
            runtime_name,
            ..Self::default()
        }
    }
}

impl Entity for EventPropertyPrimitive {
    fn register(registry: &mut Registry) -> Result<()> {
        let mut builder = registry.define(Self::CLASS, "sp:EventPropertyPrimitive")?;
        declare_common(&mut builder)?;
        builder
            .literal("runtimeType", "sp:hasRuntimeType")?
            .literals("domainProperties", "sp:domainProperty")?;
        Ok(())
    }

    fn to_instance(&self) -> EntityInstance {
        let mut e = EntityInstance::new(Self::CLASS).with("id", self.id.as_str());
        set_opt(&mut e, "runtimeName", self.runtime_name.as_ref());
        set_opt(&mut e, "label", self.label.as_ref());
        set_opt(&mut e, "description", self.description.as_ref());
        set_opt(&mut e, "runtimeType", self.runtime_type.as_ref());
        e.set("domainProperties", self.domain_properties.clone());
        e
    }

    fn from_instance(instance: &EntityInstance) -> Result<Self> {
        let fields = Fields::of(Self::CLASS, instance)?;
        Ok(Self {
            id: fields.required("id")?,
            runtime_name: fields.optional("runtimeName")?,
            label: fields.optional("label")?,
            description: fields.optional("description")?,
            runtime_type: fields.optional("runtimeType")?,
            domain_properties: fields.list("domainProperties")?,
        })
    }
}

/// A property grouping child properties (`sp:EventPropertyNested`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPropertyNested {
    /// Subject IRI.
    pub id: String,
    /// Key of the property in runtime events.
    pub runtime_name: Option<String>,
    /// Display label.
    pub label: Option<String>,
    /// Display description.
    pub description: Option<String>,
    /// Child properties in display order.
    pub event_properties: Vec<EventProperty>,
}

impl EventPropertyNested {
    /// Class identity.
    pub const CLASS: &'static str = "EventPropertyNested";

    /// Creates an empty nested property with a fresh identity.
    #[must_use]
    pub fn new(runtime_name: Option<String>) -> Self {
        Self {
            id: generate_id("urn:streampipes.org:spi:eventpropertynested:"),
            runtime_name,
            ..Self::default()
        }
    }
}

impl Entity for EventPropertyNested {
    fn register(registry: &mut Registry) -> Result<()> {
        let mut builder = registry.define(Self::CLASS, "sp:EventPropertyNested")?;
        declare_common(&mut builder)?;
        builder.entities("eventProperties", "sp:hasEventProperty")?;
        Ok(())
    }

    fn to_instance(&self) -> EntityInstance {
        let mut e = EntityInstance::new(Self::CLASS).with("id", self.id.as_str());
        set_opt(&mut e, "runtimeName", self.runtime_name.as_ref());
        set_opt(&mut e, "label", self.label.as_ref());
        set_opt(&mut e, "description", self.description.as_ref());
        e.set("eventProperties", instances(&self.event_properties));
        e
    }

    fn from_instance(instance: &EntityInstance) -> Result<Self> {
        let fields = Fields::of(Self::CLASS, instance)?;
        Ok(Self {
            id: fields.required("id")?,
            runtime_name: fields.optional("runtimeName")?,
            label: fields.optional("label")?,
            description: fields.optional("description")?,
            event_properties: fields.entities("eventProperties")?,
        })
    }
}

/// A property holding a list of values of one element type (`sp:EventPropertyList`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPropertyList {
    /// Subject IRI.
    pub id: String,
    /// Key of the property in runtime events.
    pub runtime_name: Option<String>,
    /// Display label.
    pub label: Option<String>,
    /// Display description.
    pub description: Option<String>,
    /// Element type of the list.
    pub event_property: Option<Box<EventProperty>>,
}

impl EventPropertyList {
    /// Class identity.
    pub const CLASS: &'static str = "EventPropertyList";
}

impl Entity for EventPropertyList {
    fn register(registry: &mut Registry) -> Result<()> {
        let mut builder = registry.define(Self::CLASS, "sp:EventPropertyList")?;
        declare_common(&mut builder)?;
        builder.entity("eventProperty", "sp:hasEventProperty")?;
        Ok(())
    }

    fn to_instance(&self) -> EntityInstance {
        let mut e = EntityInstance::new(Self::CLASS).with("id", self.id.as_str());
        set_opt(&mut e, "runtimeName", self.runtime_name.as_ref());
        set_opt(&mut e, "label", self.label.as_ref());
        set_opt(&mut e, "description", self.description.as_ref());
        if let Some(element) = &self.event_property {
            e.set("eventProperty", element.to_instance());
        }
        e
    }

    fn from_instance(instance: &EntityInstance) -> Result<Self> {
        let fields = Fields::of(Self::CLASS, instance)?;
        Ok(Self {
            id: fields.required("id")?,
            runtime_name: fields.optional("runtimeName")?,
            label: fields.optional("label")?,
            description: fields.optional("description")?,
            event_property: fields.entity::<EventProperty>("eventProperty")?.map(Box::new),
        })
    }
}

/// Every event property kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventProperty {
    /// A leaf value.
    Primitive(EventPropertyPrimitive),
    /// A group of child properties.
    Nested(EventPropertyNested),
    /// A list of values.
    List(EventPropertyList),
}

impl EventProperty {
    /// Subject IRI of whichever kind this is.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            EventProperty::Primitive(p) => &p.id,
            EventProperty::Nested(p) => &p.id,
            EventProperty::List(p) => &p.id,
        }
    }

    /// Runtime name of whichever kind this is.
    #[must_use]
    pub fn runtime_name(&self) -> Option<&str> {
        match self {
            EventProperty::Primitive(p) => p.runtime_name.as_deref(),
            EventProperty::Nested(p) => p.runtime_name.as_deref(),
            EventProperty::List(p) => p.runtime_name.as_deref(),
        }
    }
}

impl Entity for EventProperty {
    fn register(registry: &mut Registry) -> Result<()> {
        EventPropertyPrimitive::register(registry)?;
        EventPropertyNested::register(registry)?;
        EventPropertyList::register(registry)
    }

    fn to_instance(&self) -> EntityInstance {
        match self {
            EventProperty::Primitive(p) => p.to_instance(),
            EventProperty::Nested(p) => p.to_instance(),
            EventProperty::List(p) => p.to_instance(),
        }
    }

    fn from_instance(instance: &EntityInstance) -> Result<Self> {
        match instance.class() {
            EventPropertyPrimitive::CLASS => {
                EventPropertyPrimitive::from_instance(instance).map(Self::Primitive)
            }
            EventPropertyNested::CLASS => {
                EventPropertyNested::from_instance(instance).map(Self::Nested)
            }
            EventPropertyList::CLASS => EventPropertyList::from_instance(instance).map(Self::List),
            other => Err(MapperError::FieldType {
                class: other.to_owned(),
                field: String::new(),
                reason: "is not an event property kind",
            }),
        }
    }
}

/// The schema of a data stream or set (`sp:EventSchema`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSchema {
    /// Subject IRI.
    pub id: String,
    /// Top-level properties in display order.
    pub event_properties: Vec<EventProperty>,
}

impl EventSchema {
    /// Class identity.
    pub const CLASS: &'static str = "EventSchema";

    /// Creates an empty schema with a fresh identity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: generate_id("urn:streampipes.org:spi:eventschema:"),
            event_properties: Vec::new(),
        }
    }

    /// Appends a primitive property, returning its identity.
    pub fn add_primitive_property(&mut self) -> String {
        let property = EventPropertyPrimitive::new(None);
        let id = property.id.clone();
        self.event_properties.push(EventProperty::Primitive(property));
        id
    }

    /// Appends an empty nested property, returning its identity.
    pub fn add_nested_property(&mut self) -> String {
        let property = EventPropertyNested::new(None);
        let id = property.id.clone();
        self.event_properties.push(EventProperty::Nested(property));
        id
    }
}

impl Entity for EventSchema {
    fn register(registry: &mut Registry) -> Result<()> {
        registry
            .define(Self::CLASS, "sp:EventSchema")?
            .identity("id")?
            .entities("eventProperties", "sp:hasEventProperty")?;
        Ok(())
    }

    fn to_instance(&self) -> EntityInstance {
        EntityInstance::new(Self::CLASS)
            .with("id", self.id.as_str())
            .with("eventProperties", instances(&self.event_properties))
    }

    fn from_instance(instance: &EntityInstance) -> Result<Self> {
        let fields = Fields::of(Self::CLASS, instance)?;
        Ok(Self {
            id: fields.required("id")?,
            event_properties: fields.entities("eventProperties")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapperConfig;
    use crate::context::Context;
    use crate::decoder::Decoder;
    use crate::encoder::Encoder;
    use pretty_assertions::assert_eq;

    fn primitive(id: &str, name: &str) -> EventProperty {
        EventProperty::Primitive(EventPropertyPrimitive {
            id: id.into(),
            runtime_name: Some(name.into()),
            runtime_type: Some("http://www.w3.org/2001/XMLSchema#float".into()),
            domain_properties: vec!["http://schema.org/Number".into()],
            ..EventPropertyPrimitive::default()
        })
    }

    fn schema() -> EventSchema {
        EventSchema {
            id: "urn:schema:1".into(),
            event_properties: vec![
                primitive("urn:p:ts", "timestamp"),
                EventProperty::Nested(EventPropertyNested {
                    id: "urn:p:pos".into(),
                    runtime_name: Some("position".into()),
                    event_properties: vec![
                        primitive("urn:p:lat", "lat"),
                        primitive("urn:p:lng", "lng"),
                    ],
                    ..EventPropertyNested::default()
                }),
                EventProperty::List(EventPropertyList {
                    id: "urn:p:readings".into(),
                    runtime_name: Some("readings".into()),
                    event_property: Some(Box::new(primitive("urn:p:reading", "value"))),
                    ..EventPropertyList::default()
                }),
            ],
        }
    }

    #[test]
    fn nested_schema_round_trips() {
        let mut registry = Registry::new(Context::streampipes());
        EventSchema::register(&mut registry).unwrap();
        EventProperty::register(&mut registry).unwrap();
        let config = MapperConfig::default();

        let original = schema();
        let doc = Encoder::new(&registry, &config)
            .encode(&original.to_instance())
            .unwrap();
        // schema + 3 top-level + 2 nested children + 1 list element
        assert_eq!(doc.blocks.len(), 7);

        let roots = Decoder::new(&registry, &config).decode(&doc).unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(EventSchema::from_instance(&roots[0]).unwrap(), original);
    }

    #[test]
    fn editor_adds_properties_with_fresh_ids() {
        let mut schema = EventSchema::new();
        let a = schema.add_primitive_property();
        let b = schema.add_nested_property();
        assert_ne!(a, b);
        assert_eq!(schema.event_properties.len(), 2);
        assert!(matches!(schema.event_properties[1], EventProperty::Nested(_)));
        assert_eq!(schema.event_properties[0].id(), a);
    }
}
