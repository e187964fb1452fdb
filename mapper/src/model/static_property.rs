//! Static properties: the configuration slots a pipeline element exposes.

use crate::error::{MapperError, Result};
use crate::instance::EntityInstance;
use crate::registry::{ClassBuilder, Registry};

use super::{set_opt, Entity, Fields};

const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
const RDFS_DESCRIPTION: &str = "http://www.w3.org/2000/01/rdf-schema#description";

/// Fields shared by every static property kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticPropertyInfo {
    /// Subject IRI.
    pub id: String,
    /// Element name.
    pub element_name: Option<String>,
    /// Display label.
    pub label: Option<String>,
    /// Display description.
    pub description: Option<String>,
    /// Name the element's runtime uses for this slot.
    pub internal_name: Option<String>,
}

impl StaticPropertyInfo {
    /// Creates the shared part with only the identity set.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    fn declare(builder: &mut ClassBuilder<'_>) -> Result<()> {
        builder
            .identity("id")?
            .literal("elementName", "sp:elementName")?
            .literal("label", RDFS_LABEL)?
            .literal("description", RDFS_DESCRIPTION)?
            .literal("internalName", "sp:internalName")?;
        Ok(())
    }

    fn write(&self, class: &str) -> EntityInstance {
        let mut e = EntityInstance::new(class).with("id", self.id.as_str());
        set_opt(&mut e, "elementName", self.element_name.as_ref());
        set_opt(&mut e, "label", self.label.as_ref());
        set_opt(&mut e, "description", self.description.as_ref());
        set_opt(&mut e, "internalName", self.internal_name.as_ref());
        e
    }

    fn read(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            id: fields.required("id")?,
            element_name: fields.optional("elementName")?,
            label: fields.optional("label")?,
            description: fields.optional("description")?,
            internal_name: fields.optional("internalName")?,
        })
    }
}

/// Maps any number of event properties onto one slot (`sp:MappingPropertyNary`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingPropertyNary {
    /// Shared fields.
    pub info: StaticPropertyInfo,
    /// Selector of the stream requirement the mapping draws from.
    pub requirement_selector: Option<String>,
    /// Runtime names the user may choose from.
    pub maps_from_options: Vec<String>,
    /// Property scope (measurement, dimension, header).
    pub property_scope: Option<String>,
    /// Runtime names the user selected, one `sp:mapsTo` value each.
    ///
    /// The StreamPipes UI model holds a single `selectedProperty` string for
    /// n-ary mappings as well. Here the n-ary mapping keeps the whole
    /// selection, and [`MappingPropertyUnary::selected_property`] maps the
    /// same predicate single-valued.
    pub selected_properties: Vec<String>,
}

impl MappingPropertyNary {
    /// Class identity.
    pub const CLASS: &'static str = "MappingPropertyNary";

    /// Creates a mapping property with only the identity set.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            info: StaticPropertyInfo::new(id),
            ..Self::default()
        }
    }
}

impl Entity for MappingPropertyNary {
    fn register(registry: &mut Registry) -> Result<()> {
        let mut builder = registry.define(Self::CLASS, "sp:MappingPropertyNary")?;
        StaticPropertyInfo::declare(&mut builder)?;
        builder
            .literal("requirementSelector", "sp:mapsFrom")?
            .literals("mapsFromOptions", "sp:mapsFromOptions")?
            .literal("propertyScope", "sp:hasPropertyScope")?
            .literals("selectedProperties", "sp:mapsTo")?;
        Ok(())
    }

    fn to_instance(&self) -> EntityInstance {
        let mut e = self.info.write(Self::CLASS);
        set_opt(&mut e, "requirementSelector", self.requirement_selector.as_ref());
        e.set("mapsFromOptions", self.maps_from_options.clone());
        set_opt(&mut e, "propertyScope", self.property_scope.as_ref());
        e.set("selectedProperties", self.selected_properties.clone());
        e
    }

    fn from_instance(instance: &EntityInstance) -> Result<Self> {
        let fields = Fields::of(Self::CLASS, instance)?;
        Ok(Self {
            info: StaticPropertyInfo::read(&fields)?,
            requirement_selector: fields.optional("requirementSelector")?,
            maps_from_options: fields.list("mapsFromOptions")?,
            property_scope: fields.optional("propertyScope")?,
            selected_properties: fields.list("selectedProperties")?,
        })
    }
}

/// Maps exactly one event property onto a slot (`sp:MappingPropertyUnary`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingPropertyUnary {
    /// Shared fields.
    pub info: StaticPropertyInfo,
    /// Selector of the stream requirement the mapping draws from.
    pub requirement_selector: Option<String>,
    /// Runtime names the user may choose from.
    pub maps_from_options: Vec<String>,
    /// Property scope (measurement, dimension, header).
    pub property_scope: Option<String>,
    /// Runtime name the user selected.
    pub selected_property: Option<String>,
}

impl MappingPropertyUnary {
    /// Class identity.
    pub const CLASS: &'static str = "MappingPropertyUnary";
}

impl Entity for MappingPropertyUnary {
    fn register(registry: &mut Registry) -> Result<()> {
        let mut builder = registry.define(Self::CLASS, "sp:MappingPropertyUnary")?;
        StaticPropertyInfo::declare(&mut builder)?;
        builder
            .literal("requirementSelector", "sp:mapsFrom")?
            .literals("mapsFromOptions", "sp:mapsFromOptions")?
            .literal("propertyScope", "sp:hasPropertyScope")?
            .literal("selectedProperty", "sp:mapsTo")?;
        Ok(())
    }

    fn to_instance(&self) -> EntityInstance {
        let mut e = self.info.write(Self::CLASS);
        set_opt(&mut e, "requirementSelector", self.requirement_selector.as_ref());
        e.set("mapsFromOptions", self.maps_from_options.clone());
        set_opt(&mut e, "propertyScope", self.property_scope.as_ref());
        set_opt(&mut e, "selectedProperty", self.selected_property.as_ref());
        e
    }

    fn from_instance(instance: &EntityInstance) -> Result<Self> {
        let fields = Fields::of(Self::CLASS, instance)?;
        Ok(Self {
            info: StaticPropertyInfo::read(&fields)?,
            requirement_selector: fields.optional("requirementSelector")?,
            maps_from_options: fields.list("mapsFromOptions")?,
            property_scope: fields.optional("propertyScope")?,
            selected_property: fields.optional("selectedProperty")?,
        })
    }
}

/// A free-text input slot (`sp:FreeTextStaticProperty`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreeTextStaticProperty {
    /// Shared fields.
    pub info: StaticPropertyInfo,
    /// Entered value.
    pub value: Option<String>,
    /// XSD datatype the value must satisfy.
    pub required_datatype: Option<String>,
}

impl FreeTextStaticProperty {
    /// Class identity.
    pub const CLASS: &'static str = "FreeTextStaticProperty";
}

impl Entity for FreeTextStaticProperty {
    fn register(registry: &mut Registry) -> Result<()> {
        let mut builder = registry.define(Self::CLASS, "sp:FreeTextStaticProperty")?;
        StaticPropertyInfo::declare(&mut builder)?;
        builder
            .literal("value", "sp:hasValue")?
            .literal("requiredDatatype", "sp:requiredDatatype")?;
        Ok(())
    }

    fn to_instance(&self) -> EntityInstance {
        let mut e = self.info.write(Self::CLASS);
        set_opt(&mut e, "value", self.value.as_ref());
        set_opt(&mut e, "requiredDatatype", self.required_datatype.as_ref());
        e
    }

    fn from_instance(instance: &EntityInstance) -> Result<Self> {
        let fields = Fields::of(Self::CLASS, instance)?;
        Ok(Self {
            info: StaticPropertyInfo::read(&fields)?,
            value: fields.optional("value")?,
            required_datatype: fields.optional("requiredDatatype")?,
        })
    }
}

/// Every static property kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaticProperty {
    /// `sp:MappingPropertyNary`.
    MappingNary(MappingPropertyNary),
    /// `sp:MappingPropertyUnary`.
    MappingUnary(MappingPropertyUnary),
    /// `sp:FreeTextStaticProperty`.
    FreeText(FreeTextStaticProperty),
}

impl StaticProperty {
    /// Shared fields of whichever kind this is.
    #[must_use]
    pub fn info(&self) -> &StaticPropertyInfo {
        match self {
            StaticProperty::MappingNary(p) => &p.info,
            StaticProperty::MappingUnary(p) => &p.info,
            StaticProperty::FreeText(p) => &p.info,
        }
    }
}

impl Entity for StaticProperty {
    fn register(registry: &mut Registry) -> Result<()> {
        MappingPropertyNary::register(registry)?;
        MappingPropertyUnary::register(registry)?;
        FreeTextStaticProperty::register(registry)
    }

    fn to_instance(&self) -> EntityInstance {
        match self {
            StaticProperty::MappingNary(p) => p.to_instance(),
            StaticProperty::MappingUnary(p) => p.to_instance(),
            StaticProperty::FreeText(p) => p.to_instance(),
        }
    }

    fn from_instance(instance: &EntityInstance) -> Result<Self> {
        match instance.class() {
            MappingPropertyNary::CLASS => {
                MappingPropertyNary::from_instance(instance).map(Self::MappingNary)
            }
            MappingPropertyUnary::CLASS => {
                MappingPropertyUnary::from_instance(instance).map(Self::MappingUnary)
            }
            FreeTextStaticProperty::CLASS => {
                FreeTextStaticProperty::from_instance(instance).map(Self::FreeText)
            }
            other => Err(MapperError::FieldType {
                class: other.to_owned(),
                field: String::new(),
                reason: "is not a static property kind",
            }),
        }
    }
}
