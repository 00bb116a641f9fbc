//! Typed `fields` schema per profile
//!
//! Every member is optional. Decoding happens once per node (see
//! [`TypedNode::ingest`](super::TypedNode::ingest)); absent members become
//! `None` or an empty list.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient::{opt_string, string_or_list};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VModelFields {
    #[serde(deserialize_with = "opt_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub client: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RequirementGroupFields {
    #[serde(deserialize_with = "opt_string")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RequirementFields {
    #[serde(deserialize_with = "opt_string")]
    pub brief: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub details: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub rationale: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub acceptance_criteria: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArchitectureFields {
    #[serde(deserialize_with = "opt_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub attachments: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ComponentFields {
    #[serde(deserialize_with = "opt_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub sw_requirements: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Communication {
    #[serde(deserialize_with = "opt_string")]
    pub mode: Option<String>,
    #[serde(rename = "type", deserialize_with = "opt_string")]
    pub comm_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InterfaceFields {
    #[serde(deserialize_with = "opt_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub data_direction: Option<String>,
    pub communication: Communication,
    #[serde(deserialize_with = "string_or_list")]
    pub provided_by: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub required_by: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub sw_requirements: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub sw_data_structures: Vec<String>,
}

impl InterfaceFields {
    pub fn is_provided_by(&self, component_id: &str) -> bool {
        self.provided_by.iter().any(|id| id == component_id)
    }

    pub fn is_required_by(&self, component_id: &str) -> bool {
        self.required_by.iter().any(|id| id == component_id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DataStructureMember {
    #[serde(deserialize_with = "opt_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub data_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DataStructureFields {
    #[serde(deserialize_with = "opt_string")]
    pub description: Option<String>,
    pub fields: Vec<DataStructureMember>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DesignFields {
    #[serde(deserialize_with = "opt_string")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UnitFields {
    #[serde(deserialize_with = "opt_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub interfaces_provided: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub sw_component_refs: Vec<String>,
}

/// Type reference carried by attributes, parameters, returns and members:
/// a concrete data type id, a unit id, or neither
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TypeSpec {
    #[serde(deserialize_with = "opt_string")]
    pub data_type: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub unit_ref: Option<String>,
}

impl TypeSpec {
    pub fn data_type(id: impl Into<String>) -> Self {
        Self {
            data_type: Some(id.into()),
            unit_ref: None,
        }
    }

    pub fn unit_ref(id: impl Into<String>) -> Self {
        Self {
            data_type: None,
            unit_ref: Some(id.into()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttributeFields {
    #[serde(deserialize_with = "opt_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub scope: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub multiplicity: Option<String>,
    #[serde(flatten)]
    pub ty: TypeSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParameterSpec {
    #[serde(deserialize_with = "opt_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub ty: TypeSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReturnSpec {
    #[serde(deserialize_with = "opt_string")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub ty: TypeSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MethodFields {
    #[serde(deserialize_with = "opt_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub scope: Option<String>,
    pub parameters: Vec<ParameterSpec>,
    #[serde(rename = "return")]
    pub returns: Option<ReturnSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DataTypeMember {
    #[serde(deserialize_with = "opt_string")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub ty: TypeSpec,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EnumValue {
    #[serde(deserialize_with = "opt_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub value: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UnitDataTypeFields {
    #[serde(deserialize_with = "opt_string")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub alias_of: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub description: Option<String>,
    pub fields: Vec<DataTypeMember>,
    pub enum_values: Vec<EnumValue>,
    pub function_pointer_parameters: Option<Value>,
    pub function_pointer_return: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RelationshipFields {
    #[serde(rename = "type", deserialize_with = "opt_string")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub target: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub source_multiplicity: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub target_multiplicity: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttachmentFields {
    #[serde(deserialize_with = "opt_string")]
    pub filepath: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TestStrategyFields {
    #[serde(deserialize_with = "opt_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub tools: Vec<String>,
    #[serde(deserialize_with = "opt_string")]
    pub environment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TestPlanFields {
    #[serde(deserialize_with = "opt_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub sw_unit: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TestCaseFields {
    #[serde(deserialize_with = "opt_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub preconditions: Option<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub steps: Vec<String>,
    #[serde(deserialize_with = "opt_string")]
    pub expected_result: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub status: Option<String>,
}
