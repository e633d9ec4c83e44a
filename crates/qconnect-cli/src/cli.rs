use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "qconnect")]
#[command(about = "Query connector — find a patient and pull their records for a public-health use case")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the settings file (defaults to ./qconnect.toml if present)
    #[arg(short, long, global = true, env = "QCONNECT_CONFIG")]
    pub config: Option<String>,

    /// Log level (overrides logging.level; RUST_LOG wins over both)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List configured FHIR servers
    Servers,
    /// List supported use cases
    UseCases,
    /// Locate a patient and gather their records
    Query(QueryArgs),
}

#[derive(clap::Args)]
pub struct QueryArgs {
    /// Server id or display name
    #[arg(short, long)]
    pub server: String,
    /// Use case (e.g. gonorrhea, newborn-screening)
    #[arg(short, long)]
    pub use_case: String,
    /// Patient first name
    #[arg(long)]
    pub first_name: Option<String>,
    /// Patient last name
    #[arg(long)]
    pub last_name: Option<String>,
    /// Date of birth (YYYY-MM-DD)
    #[arg(long)]
    pub dob: Option<String>,
    /// Medical record number
    #[arg(long)]
    pub mrn: Option<String>,
    /// Phone number(s), several separated by ';'
    #[arg(long)]
    pub phone: Option<String>,
    /// JSON file holding the value sets for the use case
    #[arg(long)]
    pub value_sets: Option<String>,
    /// Print per-type record counts instead of the bundle
    #[arg(long)]
    pub summary: bool,
}
