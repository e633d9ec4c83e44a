//! Query orchestration engine.
//!
//! A run moves through patient discovery, the clinical query for the use
//! case, and (for use cases that need it) a dependent second-pass query, all
//! merged into one [`qconnect_core::ResultSet`].

pub mod discovery;
pub mod error;
pub mod orchestrator;
pub mod outcome;

pub use discovery::patient_search_path;
pub use error::{EngineError, Result};
pub use orchestrator::{Orchestrator, run_with_client};
pub use outcome::{QueryOutcome, QueryRun};
