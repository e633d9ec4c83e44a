use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use crate::error::CoreError;

/// Record types the query connector searches for or commonly receives back
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Patient,
    Observation,
    DiagnosticReport,
    Condition,
    Encounter,
    Medication,
    MedicationRequest,
    MedicationAdministration,
    Immunization,
    OperationOutcome,
    #[serde(untagged)]
    Custom(String),
}

impl ResourceType {
    pub fn as_str(&self) -> &str {
        match self {
            ResourceType::Patient => "Patient",
            ResourceType::Observation => "Observation",
            ResourceType::DiagnosticReport => "DiagnosticReport",
            ResourceType::Condition => "Condition",
            ResourceType::Encounter => "Encounter",
            ResourceType::Medication => "Medication",
            ResourceType::MedicationRequest => "MedicationRequest",
            ResourceType::MedicationAdministration => "MedicationAdministration",
            ResourceType::Immunization => "Immunization",
            ResourceType::OperationOutcome => "OperationOutcome",
            ResourceType::Custom(name) => name,
        }
    }

    /// Read the `resourceType` tag of a record, if it carries a well-formed one.
    pub fn of(record: &Value) -> Option<Self> {
        record
            .get("resourceType")
            .and_then(Value::as_str)
            .and_then(|tag| tag.parse().ok())
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Patient" => Ok(ResourceType::Patient),
            "Observation" => Ok(ResourceType::Observation),
            "DiagnosticReport" => Ok(ResourceType::DiagnosticReport),
            "Condition" => Ok(ResourceType::Condition),
            "Encounter" => Ok(ResourceType::Encounter),
            "Medication" => Ok(ResourceType::Medication),
            "MedicationRequest" => Ok(ResourceType::MedicationRequest),
            "MedicationAdministration" => Ok(ResourceType::MedicationAdministration),
            "Immunization" => Ok(ResourceType::Immunization),
            "OperationOutcome" => Ok(ResourceType::OperationOutcome),
            _ => {
                // FHIR type names are PascalCase ASCII letters
                if is_type_name(s) {
                    Ok(ResourceType::Custom(s.to_string()))
                } else {
                    Err(CoreError::invalid_resource_type(s))
                }
            }
        }
    }
}

fn is_type_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => chars.all(|c| c.is_ascii_alphabetic()),
        _ => false,
    }
}
