pub mod aggregate;
pub mod error;
pub mod fhir;
pub mod model;
pub mod phone;
pub mod plan;
pub mod use_case;

pub use aggregate::{BundleEntry, RawResponse, ResultBundle, ResultSet, assemble_bundle, parse_batch, parse_response};
pub use error::{CoreError, Result};
pub use fhir::ResourceType;
pub use model::{ClinicalCodeGrouping, Concept, ConceptType, QueryRequest, parse_value_sets};
pub use phone::expand as expand_phone;
pub use plan::{QueryIntent, QuerySpec, build_plan, dependent_path, paths_for};
pub use use_case::{QueryShape, UseCase};
