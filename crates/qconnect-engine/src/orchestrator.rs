use std::sync::Arc;
use std::time::Duration;

use qconnect_client::{FhirSearch, RemoteServerClient};
use qconnect_config::ServerConfigResolver;
use qconnect_core::plan::{self, QueryIntent, QuerySpec};
use qconnect_core::{
    ClinicalCodeGrouping, QueryRequest, RawResponse, ResourceType, ResultBundle, ResultSet,
    assemble_bundle, parse_batch, parse_response,
};
use serde_json::Value;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::discovery::patient_search_path;
use crate::error::Result;
use crate::outcome::{QueryOutcome, QueryRun};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs patient queries against servers supplied by an injected resolver
pub struct Orchestrator {
    resolver: Arc<dyn ServerConfigResolver>,
    default_timeout: Duration,
}

impl Orchestrator {
    pub fn new(resolver: Arc<dyn ServerConfigResolver>) -> Self {
        Self {
            resolver,
            default_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Request deadline for servers that do not configure their own
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Locate the patient and gather their records for the request's use case.
    ///
    /// Only configuration problems fail the run. Zero or several matching
    /// patients end the run early with the discovery results.
    pub async fn run(
        &self,
        request: &QueryRequest,
        groupings: &[ClinicalCodeGrouping],
    ) -> Result<QueryRun> {
        let server = self.resolver.resolve(&request.server_id)?;
        let client = RemoteServerClient::new(&server, self.default_timeout)?;
        Ok(run_with_client(&client, request, groupings).await)
    }

    /// [`run`](Self::run) without the discovery outcome
    pub async fn run_query(
        &self,
        request: &QueryRequest,
        groupings: &[ClinicalCodeGrouping],
    ) -> Result<ResultSet> {
        Ok(self.run(request, groupings).await?.result_set)
    }

    /// [`run_query`](Self::run_query) flattened into a searchset bundle
    pub async fn run_bundle(
        &self,
        request: &QueryRequest,
        groupings: &[ClinicalCodeGrouping],
    ) -> Result<ResultBundle> {
        let result_set = self.run_query(request, groupings).await?;
        Ok(assemble_bundle(&result_set))
    }
}

/// Run the full query flow over an already-built client.
pub async fn run_with_client(
    client: &dyn FhirSearch,
    request: &QueryRequest,
    groupings: &[ClinicalCodeGrouping],
) -> QueryRun {
    let span = info_span!(
        "run_query",
        use_case = %request.use_case,
        server = %request.server_id
    );
    async move {
        let result_set = discover_patient(client, request).await;
        let outcome = QueryOutcome::from_matches(result_set.patients().len());

        let patient_id = match single_patient_id(&result_set) {
            Some(id) => id,
            None => return QueryRun { outcome, result_set },
        };

        let spec = plan::build_plan(request.use_case, &patient_id, groupings);
        let intent = QueryIntent::from(request.use_case.query_shape());
        let result_set = clinical_query(client, &spec, &patient_id, intent, result_set).await;
        let result_set = dependent_query(client, &spec, &patient_id, result_set).await;

        info!(
            total = result_set.len(),
            counts = ?result_set.counts(),
            "query run complete"
        );
        QueryRun { outcome, result_set }
    }
    .instrument(span)
    .await
}

async fn discover_patient(client: &dyn FhirSearch, request: &QueryRequest) -> ResultSet {
    let path = patient_search_path(request);
    let result_set = match fetch_one(client, &path).await {
        Some(response) => parse_response(ResultSet::new(), &response),
        None => ResultSet::new(),
    };
    info!(patient_matches = result_set.patients().len(), "patient discovery finished");
    result_set
}

/// The id of the sole matching patient, if discovery found exactly one.
fn single_patient_id(result_set: &ResultSet) -> Option<String> {
    match result_set.patients() {
        [patient] => {
            let id = record_id(patient);
            if id.is_none() {
                warn!("matched patient has no id; skipping clinical query");
            }
            id
        }
        [] => {
            info!("no matching patient");
            None
        }
        many => {
            info!(matches = many.len(), "patient match is ambiguous");
            None
        }
    }
}

async fn clinical_query(
    client: &dyn FhirSearch,
    spec: &QuerySpec,
    patient_id: &str,
    intent: QueryIntent,
    result_set: ResultSet,
) -> ResultSet {
    let paths = plan::paths_for(spec, patient_id, intent);
    match (intent, paths.as_slice()) {
        (_, []) => {
            info!("no codes to search for; skipping clinical query");
            result_set
        }
        (QueryIntent::Observation | QueryIntent::Social, [path]) => {
            match fetch_one(client, path).await {
                Some(response) => parse_response(result_set, &response),
                None => result_set,
            }
        }
        _ => {
            debug!(requests = paths.len(), "issuing clinical batch");
            let responses = fetch_all(client, &paths).await;
            parse_batch(result_set, &responses)
        }
    }
}

async fn dependent_query(
    client: &dyn FhirSearch,
    spec: &QuerySpec,
    patient_id: &str,
    result_set: ResultSet,
) -> ResultSet {
    if !spec.has_second_pass_query {
        return result_set;
    }
    let Some(condition) = result_set.get(&ResourceType::Condition).first() else {
        debug!("no Condition found; skipping dependent Encounter query");
        return result_set;
    };
    let Some(condition_id) = record_id(condition) else {
        warn!("first Condition has no id; skipping dependent Encounter query");
        return result_set;
    };

    let path = plan::dependent_path(patient_id, &condition_id);
    match fetch_one(client, &path).await {
        Some(response) => parse_response(result_set, &response),
        None => result_set,
    }
}

async fn fetch_one(client: &dyn FhirSearch, path: &str) -> Option<RawResponse> {
    match client.fetch(path).await {
        Ok(response) => Some(response),
        Err(e) => {
            warn!(path, error = %e, "FHIR request failed");
            None
        }
    }
}

/// Fetch every path concurrently, keeping successful responses in input order.
async fn fetch_all(client: &dyn FhirSearch, paths: &[String]) -> Vec<RawResponse> {
    client
        .fetch_batch(paths)
        .await
        .into_iter()
        .zip(paths)
        .filter_map(|(result, path)| match result {
            Ok(response) => Some(response),
            Err(e) => {
                warn!(path = %path, error = %e, "FHIR request failed");
                None
            }
        })
        .collect()
}

fn record_id(record: &Value) -> Option<String> {
    record
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use qconnect_client::ClientError;
    use qconnect_core::{Concept, ConceptType, UseCase};
    use serde_json::json;
    use std::sync::Mutex;

    /// Answers each path with the first scripted response whose prefix matches
    #[derive(Default)]
    struct ScriptedSearch {
        script: Vec<(&'static str, Option<Vec<Value>>)>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedSearch {
        fn on(mut self, prefix: &'static str, resources: Vec<Value>) -> Self {
            self.script.push((prefix, Some(resources)));
            self
        }

        fn failing(mut self, prefix: &'static str) -> Self {
            self.script.push((prefix, None));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FhirSearch for ScriptedSearch {
        async fn fetch(&self, path: &str) -> qconnect_client::Result<RawResponse> {
            self.calls.lock().unwrap().push(path.to_string());
            match self.script.iter().find(|(prefix, _)| path.starts_with(prefix)) {
                Some((_, Some(resources))) => {
                    let entries: Vec<Value> =
                        resources.iter().map(|r| json!({"resource": r})).collect();
                    let body = json!({"resourceType": "Bundle", "type": "searchset", "entry": entries});
                    Ok(RawResponse::new(path, 200, body.to_string()))
                }
                Some((_, None)) => Err(ClientError::Timeout {
                    path: path.to_string(),
                }),
                None => Ok(RawResponse::new(path, 404, "not scripted")),
            }
        }
    }

    fn patient(id: &str) -> Value {
        json!({"resourceType": "Patient", "id": id})
    }

    fn groupings() -> Vec<ClinicalCodeGrouping> {
        vec![
            ClinicalCodeGrouping {
                id: "labs".into(),
                name: "labs".into(),
                author: "CSTE".into(),
                coding_system: "http://loinc.org".into(),
                concept_type: ConceptType::Lab,
                concepts: vec![Concept::new("24111-7", "", true)],
            },
            ClinicalCodeGrouping {
                id: "conditions".into(),
                name: "conditions".into(),
                author: "CSTE".into(),
                coding_system: "http://snomed.info/sct".into(),
                concept_type: ConceptType::Condition,
                concepts: vec![Concept::new("15628003", "", true)],
            },
        ]
    }

    fn request(use_case: UseCase) -> QueryRequest {
        QueryRequest::new(use_case, "test")
            .with_first_name("Jane")
            .with_last_name("Doe")
    }

    #[tokio::test]
    async fn test_no_patient_stops_after_discovery() {
        let client = ScriptedSearch::default().on("/Patient", vec![]);
        let rs = run_with_client(&client, &request(UseCase::Gonorrhea), &groupings())
            .await
            .result_set;
        assert!(rs.is_empty());
        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_ambiguous_patient_stops_after_discovery() {
        let client = ScriptedSearch::default().on("/Patient", vec![patient("a"), patient("b")]);
        let rs = run_with_client(&client, &request(UseCase::Gonorrhea), &groupings())
            .await
            .result_set;
        assert_eq!(rs.patients().len(), 2);
        assert_eq!(rs.len(), 2);
        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_outcome_fixed_at_discovery() {
        // A clinical search that also returns the subject's Patient record
        let client = ScriptedSearch::default()
            .on("/Patient", vec![patient("p1")])
            .on(
                "/Observation",
                vec![
                    json!({"resourceType": "Observation", "id": "o1"}),
                    patient("p1"),
                ],
            );
        let run =
            run_with_client(&client, &request(UseCase::NewbornScreening), &groupings()).await;

        assert_eq!(run.outcome, QueryOutcome::Found);
        assert_eq!(run.result_set.patients().len(), 2);
    }

    #[tokio::test]
    async fn test_ambiguous_outcome_reports_match_count() {
        let client = ScriptedSearch::default()
            .on("/Patient", vec![patient("a"), patient("b"), patient("c")]);
        let run = run_with_client(&client, &request(UseCase::Gonorrhea), &groupings()).await;
        assert_eq!(run.outcome, QueryOutcome::Ambiguous(3));
    }

    #[tokio::test]
    async fn test_discovery_failure_returns_empty_set() {
        let client = ScriptedSearch::default().failing("/Patient");
        let rs = run_with_client(&client, &request(UseCase::Gonorrhea), &groupings())
            .await
            .result_set;
        assert!(rs.is_empty());
    }

    #[tokio::test]
    async fn test_dependent_query_skipped_without_condition() {
        let client = ScriptedSearch::default()
            .on("/Patient", vec![patient("p1")])
            .on(
                "/Observation",
                vec![json!({"resourceType": "Observation", "id": "o1"})],
            );
        let rs = run_with_client(&client, &request(UseCase::Gonorrhea), &groupings())
            .await
            .result_set;

        let calls = client.calls();
        assert!(calls.iter().all(|c| !c.contains("reason-reference")));
        // Patient + Observation, DiagnosticReport, Condition, Encounter
        assert_eq!(calls.len(), 5);
        assert_eq!(rs.len(), 2);
    }

    #[tokio::test]
    async fn test_dependent_query_uses_first_condition() {
        let client = ScriptedSearch::default()
            .on("/Patient", vec![patient("p1")])
            .on(
                "/Condition",
                vec![
                    json!({"resourceType": "Condition", "id": "c1"}),
                    json!({"resourceType": "Condition", "id": "c2"}),
                ],
            )
            .on(
                "/Encounter?subject=Patient%2Fp1&reason-reference",
                vec![json!({"resourceType": "Encounter", "id": "e1"})],
            );
        let rs = run_with_client(&client, &request(UseCase::Chlamydia), &groupings())
            .await
            .result_set;

        let calls = client.calls();
        assert_eq!(
            calls.last().unwrap(),
            "/Encounter?subject=Patient%2Fp1&reason-reference=Condition%2Fc1"
        );
        assert_eq!(rs.count(&ResourceType::Encounter), 1);
        assert_eq!(rs.count(&ResourceType::Condition), 2);
    }

    #[tokio::test]
    async fn test_no_second_pass_for_cancer() {
        let client = ScriptedSearch::default()
            .on("/Patient", vec![patient("p1")])
            .on("/Condition", vec![json!({"resourceType": "Condition", "id": "c1"})]);
        run_with_client(&client, &request(UseCase::Cancer), &groupings()).await;
        assert!(client.calls().iter().all(|c| !c.contains("reason-reference")));
    }

    #[tokio::test]
    async fn test_social_use_case_issues_single_call() {
        let client = ScriptedSearch::default()
            .on("/Patient", vec![patient("p1")])
            .on(
                "/Observation",
                vec![json!({"resourceType": "Observation", "id": "housing"})],
            );
        let rs = run_with_client(&client, &request(UseCase::SocialDeterminants), &groupings())
            .await
            .result_set;
        assert_eq!(
            client.calls(),
            vec![
                "/Patient?given=Jane&family=Doe".to_string(),
                "/Observation?subject=Patient%2Fp1&category=social-history".to_string(),
            ]
        );
        assert_eq!(rs.count(&ResourceType::Observation), 1);
    }

    #[tokio::test]
    async fn test_batch_member_failure_keeps_siblings() {
        let client = ScriptedSearch::default()
            .on("/Patient", vec![patient("p1")])
            .failing("/Observation")
            .on(
                "/DiagnosticReport",
                vec![json!({"resourceType": "DiagnosticReport", "id": "d1"})],
            );
        let rs = run_with_client(&client, &request(UseCase::Cancer), &groupings())
            .await
            .result_set;
        assert_eq!(rs.count(&ResourceType::DiagnosticReport), 1);
        assert_eq!(rs.count(&ResourceType::Observation), 0);
    }

    #[tokio::test]
    async fn test_general_use_case_without_codes_skips_clinical_query() {
        let client = ScriptedSearch::default().on("/Patient", vec![patient("p1")]);
        let rs = run_with_client(&client, &request(UseCase::Cancer), &[])
            .await
            .result_set;
        assert_eq!(client.calls().len(), 1);
        assert_eq!(rs.len(), 1);
    }
}
