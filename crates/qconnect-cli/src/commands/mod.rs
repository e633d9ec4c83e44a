pub mod query;
pub mod servers;
pub mod use_cases;
