//! Data sets and pipeline template invocations.

use crate::error::Result;
use crate::instance::EntityInstance;
use crate::registry::Registry;

use super::{instances, set_opt, Entity, EventSchema, Fields, StaticProperty};

/// A stored data set with its schema (`sp:DataSet`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataSetDescription {
    /// Subject IRI.
    pub id: String,
    /// Display label.
    pub label: Option<String>,
    /// Display description.
    pub description: Option<String>,
    /// Schema of the events in the set.
    pub event_schema: Option<EventSchema>,
}

impl DataSetDescription {
    /// Class identity.
    pub const CLASS: &'static str = "DataSetDescription";
}

impl Entity for DataSetDescription {
    fn register(registry: &mut Registry) -> Result<()> {
        registry
            .define(Self::CLASS, "sp:DataSet")?
            .identity("id")?
            .literal("label", "http://www.w3.org/2000/01/rdf-schema#label")?
            .literal("description", "http://www.w3.org/2000/01/rdf-schema#description")?
            .entity("eventSchema", "sp:hasSchema")?;
        Ok(())
    }

    fn to_instance(&self) -> EntityInstance {
        let mut e = EntityInstance::new(Self::CLASS).with("id", self.id.as_str());
        set_opt(&mut e, "label", self.label.as_ref());
        set_opt(&mut e, "description", self.description.as_ref());
        if let Some(schema) = &self.event_schema {
            e.set("eventSchema", schema.to_instance());
        }
        e
    }

    fn from_instance(instance: &EntityInstance) -> Result<Self> {
        let fields = Fields::of(Self::CLASS, instance)?;
        Ok(Self {
            id: fields.required("id")?,
            label: fields.optional("label")?,
            description: fields.optional("description")?,
            event_schema: fields.entity("eventSchema")?,
        })
    }
}

/// A request to instantiate a pipeline template against a data set
/// (`sp:PipelineTemplateInvocation`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineTemplateInvocation {
    /// Subject IRI.
    pub id: String,
    /// Name of the resulting pipeline.
    pub name: Option<String>,
    /// Element id of the data set the pipeline reads.
    pub data_set_id: Option<String>,
    /// Id of the template being invoked.
    pub pipeline_template_id: Option<String>,
    /// User configuration for the template's static properties.
    pub static_properties: Vec<StaticProperty>,
}

impl PipelineTemplateInvocation {
    /// Class identity.
    pub const CLASS: &'static str = "PipelineTemplateInvocation";
}

impl Entity for PipelineTemplateInvocation {
    fn register(registry: &mut Registry) -> Result<()> {
        registry
            .define(Self::CLASS, "sp:PipelineTemplateInvocation")?
            .identity("id")?
            .literal("name", "http://www.w3.org/2000/01/rdf-schema#label")?
            .literal("dataSetId", "sp:hasDataSetId")?
            .literal("pipelineTemplateId", "sp:hasPipelineTemplateId")?
            .entities("staticProperties", "sp:hasStaticProperty")?;
        Ok(())
    }

    fn to_instance(&self) -> EntityInstance {
        let mut e = EntityInstance::new(Self::CLASS).with("id", self.id.as_str());
        set_opt(&mut e, "name", self.name.as_ref());
        set_opt(&mut e, "dataSetId", self.data_set_id.as_ref());
        set_opt(&mut e, "pipelineTemplateId", self.pipeline_template_id.as_ref());
        e.set("staticProperties", instances(&self.static_properties));
        e
    }

    fn from_instance(instance: &EntityInstance) -> Result<Self> {
        let fields = Fields::of(Self::CLASS, instance)?;
        Ok(Self {
            id: fields.required("id")?,
            name: fields.optional("name")?,
            data_set_id: fields.optional("dataSetId")?,
            pipeline_template_id: fields.optional("pipelineTemplateId")?,
            static_properties: fields.entities("staticProperties")?,
        })
    }
}
