//! Node profiles (type discriminators) known to the generator

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Type discriminator of a node in the remote graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    VModel,
    SwRequirementsGroup,
    SwRequirement,
    SwArchitecture,
    SwComponent,
    SwInterface,
    SwDataStructure,
    SwDesign,
    SwUnit,
    SwUnitAttribute,
    SwUnitMethod,
    SwUnitRelationship,
    SwUnitDataType,
    Attachment,
    SwUnitTestStrategy,
    SwUnitTestPlan,
    SwUnitTestCase,
}

impl Profile {
    pub const ALL: [Profile; 17] = [
        Profile::VModel,
        Profile::SwRequirementsGroup,
        Profile::SwRequirement,
        Profile::SwArchitecture,
        Profile::SwComponent,
        Profile::SwInterface,
        Profile::SwDataStructure,
        Profile::SwDesign,
        Profile::SwUnit,
        Profile::SwUnitAttribute,
        Profile::SwUnitMethod,
        Profile::SwUnitRelationship,
        Profile::SwUnitDataType,
        Profile::Attachment,
        Profile::SwUnitTestStrategy,
        Profile::SwUnitTestPlan,
        Profile::SwUnitTestCase,
    ];

    /// Profiles whose children are listed through the children endpoint
    pub const CONTAINERS: [Profile; 3] = [
        Profile::SwUnit,
        Profile::SwUnitTestStrategy,
        Profile::SwUnitTestPlan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::VModel => "v_model",
            Profile::SwRequirementsGroup => "sw_requirements_group",
            Profile::SwRequirement => "sw_requirement",
            Profile::SwArchitecture => "sw_architecture",
            Profile::SwComponent => "sw_component",
            Profile::SwInterface => "sw_interface",
            Profile::SwDataStructure => "sw_data_structure",
            Profile::SwDesign => "sw_design",
            Profile::SwUnit => "sw_unit",
            Profile::SwUnitAttribute => "sw_unit_attribute",
            Profile::SwUnitMethod => "sw_unit_method",
            Profile::SwUnitRelationship => "sw_unit_relationship",
            Profile::SwUnitDataType => "sw_unit_data_type",
            Profile::Attachment => "attachment",
            Profile::SwUnitTestStrategy => "sw_unit_test_strategy",
            Profile::SwUnitTestPlan => "sw_unit_test_plan",
            Profile::SwUnitTestCase => "sw_unit_test_case",
        }
    }

    /// Label used when a node carries neither a label nor a name
    pub fn default_label(&self) -> &'static str {
        match self {
            Profile::VModel => "Project Overview",
            Profile::SwRequirementsGroup => "Group",
            Profile::SwRequirement => "Requirement",
            Profile::SwArchitecture => "Software Architecture",
            Profile::SwComponent => "Component",
            Profile::SwInterface => "Interface",
            Profile::SwDataStructure => "Data Structure",
            Profile::SwDesign => "Software Design",
            Profile::SwUnit => "Unit",
            Profile::SwUnitAttribute => "Attribute",
            Profile::SwUnitMethod => "Method",
            Profile::SwUnitRelationship => "Relationship",
            Profile::SwUnitDataType => "DataType",
            Profile::Attachment => "Attachment",
            Profile::SwUnitTestStrategy => "Unit Test Strategy",
            Profile::SwUnitTestPlan => "Test Plan",
            Profile::SwUnitTestCase => "Test Case",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Profile::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown profile '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_round_trips_through_str() {
        for profile in Profile::ALL {
            assert_eq!(profile.as_str().parse::<Profile>(), Ok(profile));
        }
        assert!("sw_widget".parse::<Profile>().is_err());
    }

    #[test]
    fn test_serde_name_matches_wire_name() {
        let json = serde_json::to_string(&Profile::SwUnitTestStrategy).unwrap();
        assert_eq!(json, "\"sw_unit_test_strategy\"");
        let json = serde_json::to_string(&Profile::VModel).unwrap();
        assert_eq!(json, "\"v_model\"");
    }
}
