use thiserror::Error;

/// Core error types for query planning and aggregation
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Unknown use case: {0}")]
    InvalidUseCase(String),

    #[error("Unknown concept type: {0}")]
    InvalidConceptType(String),

    #[error("Invalid resource type: {0}")]
    InvalidResourceType(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a new InvalidUseCase error
    pub fn invalid_use_case(use_case: impl Into<String>) -> Self {
        Self::InvalidUseCase(use_case.into())
    }

    /// Create a new InvalidConceptType error
    pub fn invalid_concept_type(concept_type: impl Into<String>) -> Self {
        Self::InvalidConceptType(concept_type.into())
    }

    /// Create a new InvalidResourceType error
    pub fn invalid_resource_type(resource_type: impl Into<String>) -> Self {
        Self::InvalidResourceType(resource_type.into())
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
