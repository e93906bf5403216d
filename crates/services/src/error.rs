//! Shared error types for the services crate.

use thiserror::Error;

use assess_core::model::AssessmentId;
use storage::repository::StorageError;

/// Errors emitted by `AssessmentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssessmentServiceError {
    #[error("assessment {id} has no attempts remaining ({max} allowed)")]
    AttemptsExhausted { id: AssessmentId, max: u32 },
    #[error("no questions available for assessment {0}")]
    NoQuestions(AssessmentId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
