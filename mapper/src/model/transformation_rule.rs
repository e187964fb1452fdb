//! Schema transformation rules recorded by the schema editor.

use crate::error::{MapperError, Result};
use crate::instance::EntityInstance;
use crate::registry::Registry;

use super::{generate_id, Entity, Fields};

/// Namespace under which new rule identities are minted.
pub const RULE_NAMESPACE: &str = "http://streampipes.org/transformation_rule/";

/// Creates a nested property at a runtime key (`sp:CreateNestedRuleDescription`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddNestedRule {
    /// Subject IRI.
    pub id: String,
    /// Runtime key of the new nested property.
    pub runtime_key: String,
}

impl AddNestedRule {
    /// Class identity.
    pub const CLASS: &'static str = "AddNestedRuleDescription";

    /// Creates a rule with a fresh identity.
    #[must_use]
    pub fn new(runtime_key: impl Into<String>) -> Self {
        Self {
            id: generate_id(RULE_NAMESPACE),
            runtime_key: runtime_key.into(),
        }
    }
}

impl Entity for AddNestedRule {
    fn register(registry: &mut Registry) -> Result<()> {
        registry
            .define(Self::CLASS, "sp:CreateNestedRuleDescription")?
            .identity("id")?
            .literal("runtimeKey", "sp:runtimeKey")?;
        Ok(())
    }

    fn to_instance(&self) -> EntityInstance {
        EntityInstance::new(Self::CLASS)
            .with("id", self.id.as_str())
            .with("runtimeKey", self.runtime_key.as_str())
    }

    fn from_instance(instance: &EntityInstance) -> Result<Self> {
        let fields = Fields::of(Self::CLASS, instance)?;
        Ok(Self {
            id: fields.required("id")?,
            runtime_key: fields.required("runtimeKey")?,
        })
    }
}

/// Renames a property (`sp:RenameRuleDescription`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRule {
    /// Subject IRI.
    pub id: String,
    /// Runtime key before the rename.
    pub old_runtime_key: String,
    /// Runtime key after the rename.
    pub new_runtime_key: String,
}

impl RenameRule {
    /// Class identity.
    pub const CLASS: &'static str = "RenameRuleDescription";

    /// Creates a rule with a fresh identity.
    #[must_use]
    pub fn new(old_runtime_key: impl Into<String>, new_runtime_key: impl Into<String>) -> Self {
        Self {
            id: generate_id(RULE_NAMESPACE),
            old_runtime_key: old_runtime_key.into(),
            new_runtime_key: new_runtime_key.into(),
        }
    }
}

impl Entity for RenameRule {
    fn register(registry: &mut Registry) -> Result<()> {
        registry
            .define(Self::CLASS, "sp:RenameRuleDescription")?
            .identity("id")?
            .literal("oldRuntimeKey", "sp:oldRuntimeName")?
            .literal("newRuntimeKey", "sp:newRuntimeName")?;
        Ok(())
    }

    fn to_instance(&self) -> EntityInstance {
        EntityInstance::new(Self::CLASS)
            .with("id", self.id.as_str())
            .with("oldRuntimeKey", self.old_runtime_key.as_str())
            .with("newRuntimeKey", self.new_runtime_key.as_str())
    }

    fn from_instance(instance: &EntityInstance) -> Result<Self> {
        let fields = Fields::of(Self::CLASS, instance)?;
        Ok(Self {
            id: fields.required("id")?,
            old_runtime_key: fields.required("oldRuntimeKey")?,
            new_runtime_key: fields.required("newRuntimeKey")?,
        })
    }
}

/// Removes a property (`sp:DeleteRuleDescription`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRule {
    /// Subject IRI.
    pub id: String,
    /// Runtime key of the removed property.
    pub runtime_key: String,
}

impl DeleteRule {
    /// Class identity.
    pub const CLASS: &'static str = "DeleteRuleDescription";

    /// Creates a rule with a fresh identity.
    #[must_use]
    pub fn new(runtime_key: impl Into<String>) -> Self {
        Self {
            id: generate_id(RULE_NAMESPACE),
            runtime_key: runtime_key.into(),
        }
    }
}

impl Entity for DeleteRule {
    fn register(registry: &mut Registry) -> Result<()> {
        registry
            .define(Self::CLASS, "sp:DeleteRuleDescription")?
            .identity("id")?
            .literal("runtimeKey", "sp:runtimeKey")?;
        Ok(())
    }

    fn to_instance(&self) -> EntityInstance {
        EntityInstance::new(Self::CLASS)
            .with("id", self.id.as_str())
            .with("runtimeKey", self.runtime_key.as_str())
    }

    fn from_instance(instance: &EntityInstance) -> Result<Self> {
        let fields = Fields::of(Self::CLASS, instance)?;
        Ok(Self {
            id: fields.required("id")?,
            runtime_key: fields.required("runtimeKey")?,
        })
    }
}

/// Every transformation rule kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformationRule {
    /// Create a nested property.
    AddNested(AddNestedRule),
    /// Rename a property.
    Rename(RenameRule),
    /// Delete a property.
    Delete(DeleteRule),
}

impl TransformationRule {
    /// Subject IRI of whichever kind this is.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            TransformationRule::AddNested(r) => &r.id,
            TransformationRule::Rename(r) => &r.id,
            TransformationRule::Delete(r) => &r.id,
        }
    }
}

impl Entity for TransformationRule {
    fn register(registry: &mut Registry) -> Result<()> {
        AddNestedRule::register(registry)?;
        RenameRule::register(registry)?;
        DeleteRule::register(registry)
    }

    fn to_instance(&self) -> EntityInstance {
        match self {
            TransformationRule::AddNested(r) => r.to_instance(),
            TransformationRule::Rename(r) => r.to_instance(),
            TransformationRule::Delete(r) => r.to_instance(),
        }
    }

    fn from_instance(instance: &EntityInstance) -> Result<Self> {
        match instance.class() {
            AddNestedRule::CLASS => AddNestedRule::from_instance(instance).map(Self::AddNested),
            RenameRule::CLASS => RenameRule::from_instance(instance).map(Self::Rename),
            DeleteRule::CLASS => DeleteRule::from_instance(instance).map(Self::Delete),
            other => Err(MapperError::FieldType {
                class: other.to_owned(),
                field: String::new(),
                reason: "is not a transformation rule kind",
            }),
        }
    }
}
