//! Query plan construction: from value sets to FHIR search paths.

use std::collections::BTreeSet;

use tracing::debug;

use crate::model::{ClinicalCodeGrouping, ConceptType};
use crate::use_case::{QueryShape, UseCase};

/// Coding system whose concepts are encounter classes rather than findings
pub const ACT_CODE_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/v3-ActCode";

/// Which subset of the clinical query to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryIntent {
    Observation,
    Social,
    General,
}

impl From<QueryShape> for QueryIntent {
    fn from(shape: QueryShape) -> Self {
        match shape {
            QueryShape::Social => QueryIntent::Social,
            QueryShape::ObservationOnly => QueryIntent::Observation,
            QueryShape::General => QueryIntent::General,
        }
    }
}

/// Codes to search for, partitioned by the resource they filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySpec {
    pub lab_codes: BTreeSet<String>,
    pub condition_codes: BTreeSet<String>,
    pub medication_codes: BTreeSet<String>,
    pub class_codes: BTreeSet<String>,
    pub has_second_pass_query: bool,
}

impl QuerySpec {
    pub fn is_empty(&self) -> bool {
        self.lab_codes.is_empty()
            && self.condition_codes.is_empty()
            && self.medication_codes.is_empty()
            && self.class_codes.is_empty()
    }
}

/// Build the query spec for a use case from its value sets.
///
/// Only included concepts contribute codes. An empty grouping list yields an
/// empty spec rather than an error.
pub fn build_plan(
    use_case: UseCase,
    patient_id: &str,
    groupings: &[ClinicalCodeGrouping],
) -> QuerySpec {
    let mut spec = QuerySpec {
        has_second_pass_query: use_case.has_second_pass_query(),
        ..QuerySpec::default()
    };

    for grouping in groupings {
        let target = if grouping.coding_system == ACT_CODE_SYSTEM {
            &mut spec.class_codes
        } else {
            match grouping.concept_type {
                ConceptType::Lab => &mut spec.lab_codes,
                ConceptType::Condition => &mut spec.condition_codes,
                ConceptType::Medication => &mut spec.medication_codes,
            }
        };
        target.extend(grouping.included_codes().map(str::to_string));
    }

    debug!(
        use_case = %use_case,
        patient_id,
        labs = spec.lab_codes.len(),
        conditions = spec.condition_codes.len(),
        medications = spec.medication_codes.len(),
        classes = spec.class_codes.len(),
        "built query spec"
    );
    spec
}

/// Render the search paths for one intent of a query spec.
///
/// `Observation` and `Social` always produce exactly one path. `General`
/// produces one path per resource implied by each non-empty code partition.
pub fn paths_for(spec: &QuerySpec, patient_id: &str, intent: QueryIntent) -> Vec<String> {
    let subject = format!("subject={}", encode_value(&format!("Patient/{patient_id}")));
    let labs = join_codes(&spec.lab_codes);
    let conditions = join_codes(&spec.condition_codes);
    let medications = join_codes(&spec.medication_codes);
    let classes = join_codes(&spec.class_codes);

    match intent {
        QueryIntent::Observation => {
            let mut path = format!("/Observation?{subject}");
            if !labs.is_empty() {
                path.push_str(&format!("&code={labs}"));
            }
            vec![path]
        }
        QueryIntent::Social => {
            vec![format!("/Observation?{subject}&category=social-history")]
        }
        QueryIntent::General => {
            let mut paths = Vec::new();
            if !labs.is_empty() {
                paths.push(format!("/Observation?{subject}&code={labs}"));
                paths.push(format!("/DiagnosticReport?{subject}&code={labs}"));
            }
            if !conditions.is_empty() {
                paths.push(format!("/Condition?{subject}&code={conditions}"));
                paths.push(format!("/Encounter?{subject}&reason-code={conditions}"));
            }
            if !medications.is_empty() {
                paths.push(format!(
                    "/MedicationRequest?{subject}&code={medications}\
                     &_include=MedicationRequest:medication\
                     &_revinclude=MedicationAdministration:request"
                ));
            }
            if !classes.is_empty() {
                paths.push(format!("/Encounter?{subject}&class={classes}"));
            }
            paths
        }
    }
}

/// Second-pass search for Encounters whose reason is a pass-one Condition
pub fn dependent_path(patient_id: &str, condition_id: &str) -> String {
    format!(
        "/Encounter?subject={}&reason-reference={}",
        encode_value(&format!("Patient/{patient_id}")),
        encode_value(&format!("Condition/{condition_id}"))
    )
}

/// Form-url-encode a single search value.
pub fn encode_value(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Join alternative values with a literal comma, encoding each one.
pub fn join_values<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    values
        .into_iter()
        .map(encode_value)
        .collect::<Vec<_>>()
        .join(",")
}

fn join_codes(codes: &BTreeSet<String>) -> String {
    join_values(codes.iter().map(String::as_str))
}
