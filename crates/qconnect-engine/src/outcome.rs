use qconnect_core::ResultSet;

/// How patient discovery ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    NotFound,
    /// More than one patient matched; the caller must narrow the demographics
    Ambiguous(usize),
    Found,
}

impl QueryOutcome {
    /// Classify by the number of patients the discovery search returned
    pub fn from_matches(matches: usize) -> Self {
        match matches {
            0 => QueryOutcome::NotFound,
            1 => QueryOutcome::Found,
            n => QueryOutcome::Ambiguous(n),
        }
    }
}

/// A finished query run.
///
/// `outcome` is fixed when discovery ends, so Patient records pulled in later
/// by clinical searches do not change it.
#[derive(Debug, Clone)]
pub struct QueryRun {
    pub outcome: QueryOutcome,
    pub result_set: ResultSet,
}
