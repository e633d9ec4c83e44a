//! Inbound data model: the patient query request and clinician-curated value sets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result as CoreResult};
use crate::use_case::UseCase;

/// A request to locate one patient and pull their records for a use case.
///
/// Demographic fields are optional; each one that is present becomes one
/// filter term of the patient search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub use_case: UseCase,
    pub server_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl QueryRequest {
    pub fn new(use_case: UseCase, server_id: impl Into<String>) -> Self {
        Self {
            use_case,
            server_id: server_id.into(),
            first_name: None,
            last_name: None,
            date_of_birth: None,
            record_number: None,
            phone: None,
        }
    }

    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    pub fn with_date_of_birth(mut self, date_of_birth: impl Into<String>) -> Self {
        self.date_of_birth = Some(date_of_birth.into());
        self
    }

    pub fn with_record_number(mut self, record_number: impl Into<String>) -> Self {
        self.record_number = Some(record_number.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Category of clinical concept held in a value set.
///
/// Value set files may spell it in any case, singular or plural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ConceptType {
    Lab,
    Medication,
    Condition,
}

impl fmt::Display for ConceptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConceptType::Lab => write!(f, "lab"),
            ConceptType::Medication => write!(f, "medication"),
            ConceptType::Condition => write!(f, "condition"),
        }
    }
}

impl FromStr for ConceptType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lab" | "labs" => Ok(ConceptType::Lab),
            "medication" | "medications" => Ok(ConceptType::Medication),
            "condition" | "conditions" => Ok(ConceptType::Condition),
            _ => Err(CoreError::invalid_concept_type(s)),
        }
    }
}

impl TryFrom<String> for ConceptType {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ConceptType> for String {
    fn from(value: ConceptType) -> Self {
        value.to_string()
    }
}

/// One code inside a value set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub code: String,
    #[serde(default)]
    pub display: String,
    #[serde(default = "default_included")]
    pub included: bool,
}

fn default_included() -> bool {
    true
}

impl Concept {
    pub fn new(code: impl Into<String>, display: impl Into<String>, included: bool) -> Self {
        Self {
            code: code.into(),
            display: display.into(),
            included,
        }
    }
}

/// A named, authored collection of clinical codes ("value set")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalCodeGrouping {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub author: String,
    pub coding_system: String,
    pub concept_type: ConceptType,
    #[serde(default)]
    pub concepts: Vec<Concept>,
}

impl ClinicalCodeGrouping {
    /// Codes of the concepts that participate in query construction
    pub fn included_codes(&self) -> impl Iterator<Item = &str> {
        self.concepts
            .iter()
            .filter(|c| c.included)
            .map(|c| c.code.as_str())
    }
}

/// Parse a value set document: a JSON array of groupings.
pub fn parse_value_sets(json: &str) -> CoreResult<Vec<ClinicalCodeGrouping>> {
    let groupings: Vec<ClinicalCodeGrouping> = serde_json::from_str(json)?;
    Ok(groupings)
}
