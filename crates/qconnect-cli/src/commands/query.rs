use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use qconnect_config::AppConfig;
use qconnect_core::{
    ClinicalCodeGrouping, QueryRequest, UseCase, assemble_bundle, parse_value_sets,
};
use qconnect_engine::{Orchestrator, QueryOutcome, QueryRun};

use crate::cli::QueryArgs;
use crate::output::{print_counts, print_json, print_warning};

pub async fn run(cfg: &AppConfig, args: &QueryArgs) -> Result<()> {
    let request = build_request(args)?;
    let groupings = match &args.value_sets {
        Some(path) => load_value_sets(path)?,
        None => {
            print_warning("No --value-sets given; clinical queries will carry no code filters");
            Vec::new()
        }
    };

    tracing::info!(
        server = %request.server_id,
        use_case = %request.use_case,
        value_sets = groupings.len(),
        "starting query"
    );
    let orchestrator = Orchestrator::new(Arc::new(cfg.registry()))
        .with_default_timeout(cfg.http.request_timeout());
    let QueryRun { outcome, result_set } = orchestrator.run(&request, &groupings).await?;

    match outcome {
        QueryOutcome::NotFound => print_warning("No patient matched the given demographics"),
        QueryOutcome::Ambiguous(n) => print_warning(&format!(
            "{n} patients matched; add more demographics to narrow the search"
        )),
        QueryOutcome::Found => {}
    }

    if args.summary {
        print_counts(&result_set.counts());
    } else {
        let bundle = serde_json::to_value(assemble_bundle(&result_set))?;
        print_json(&bundle);
    }
    Ok(())
}

fn build_request(args: &QueryArgs) -> Result<QueryRequest> {
    let use_case: UseCase = args.use_case.parse()?;
    Ok(QueryRequest {
        use_case,
        server_id: args.server.clone(),
        first_name: args.first_name.clone(),
        last_name: args.last_name.clone(),
        date_of_birth: args.dob.clone(),
        record_number: args.mrn.clone(),
        phone: args.phone.clone(),
    })
}

fn load_value_sets(path: &str) -> Result<Vec<ClinicalCodeGrouping>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read value sets from {path}"))?;
    parse_value_sets(&content).with_context(|| format!("Invalid value sets in {path}"))
}
