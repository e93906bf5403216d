use std::sync::Arc;

use tracing::{info, warn};

use assess_core::model::{AssessmentDefinition, AssessmentId, AssessmentResult};
use storage::repository::{AttemptRepository, QuestionBank};

use super::manager::AssessmentSessionManager;
use super::state::SessionSnapshot;
use crate::error::AssessmentServiceError;

/// Checks that another attempt may be started.
///
/// # Errors
///
/// Returns `AssessmentServiceError::AttemptsExhausted` once `attempts`
/// has reached `max_attempts`.
pub fn ensure_attempts_remaining(
    definition: &AssessmentDefinition,
) -> Result<u32, AssessmentServiceError> {
    if definition.has_attempts_remaining() {
        Ok(definition.attempts_remaining())
    } else {
        Err(AssessmentServiceError::AttemptsExhausted {
            id: definition.id(),
            max: definition.max_attempts(),
        })
    }
}

/// Orchestrates storage-backed attempts around a session manager.
///
/// Loads definitions and questions, gates on remaining attempts, and records
/// finished results so the next start sees the updated attempt count.
#[derive(Clone)]
pub struct AssessmentService {
    manager: AssessmentSessionManager,
    questions: Arc<dyn QuestionBank>,
    attempts: Arc<dyn AttemptRepository>,
}

impl AssessmentService {
    #[must_use]
    pub fn new(
        manager: AssessmentSessionManager,
        questions: Arc<dyn QuestionBank>,
        attempts: Arc<dyn AttemptRepository>,
    ) -> Self {
        Self {
            manager,
            questions,
            attempts,
        }
    }

    #[must_use]
    pub fn manager(&self) -> &AssessmentSessionManager {
        &self.manager
    }

    /// All known assessments.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentServiceError::Storage` when the repository fails.
    pub async fn catalog(&self) -> Result<Vec<AssessmentDefinition>, AssessmentServiceError> {
        Ok(self.attempts.list_definitions().await?)
    }

    /// Start an attempt for the given assessment.
    ///
    /// # Errors
    ///
    /// Returns `AttemptsExhausted` when no attempts remain, `NoQuestions`
    /// when the bank returns nothing, or `Storage` for repository failures.
    pub async fn start(
        &self,
        assessment_id: AssessmentId,
    ) -> Result<SessionSnapshot, AssessmentServiceError> {
        // A timed-out attempt still counts; record it before reading the definition.
        if let Some(expired) = self.collect_expired().await? {
            info!(assessment_id = %expired.definition().id(), "recorded timed-out attempt");
        }
        let definition = self.attempts.get_definition(assessment_id).await?;
        let remaining = ensure_attempts_remaining(&definition)?;

        let limit = usize::try_from(definition.question_count()).unwrap_or(usize::MAX);
        let questions = self.questions.questions(assessment_id, limit).await?;
        if questions.is_empty() {
            return Err(AssessmentServiceError::NoQuestions(assessment_id));
        }
        if questions.len() < limit {
            warn!(
                %assessment_id,
                requested = limit,
                available = questions.len(),
                "question bank returned fewer questions than configured"
            );
        }

        self.manager.start_assessment(&definition, questions);
        info!(%assessment_id, attempts_remaining = remaining, "attempt opened");

        self.manager
            .snapshot()
            .ok_or(AssessmentServiceError::NoQuestions(assessment_id))
    }

    /// Submit the running attempt and record it.
    ///
    /// When the countdown already finalised the attempt, that pending result
    /// is recorded and returned instead. Returns `Ok(None)` when there is
    /// neither an active session nor a pending result.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentServiceError::Storage` if recording fails. The
    /// session has already ended at that point.
    pub async fn submit(&self) -> Result<Option<AssessmentResult>, AssessmentServiceError> {
        let Some(result) = self.manager.submit_assessment() else {
            return self.collect_expired().await;
        };
        self.record(&result).await?;
        Ok(Some(result))
    }

    /// Record a result the countdown finalised, if one is pending.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentServiceError::Storage` if recording fails.
    pub async fn collect_expired(
        &self,
    ) -> Result<Option<AssessmentResult>, AssessmentServiceError> {
        let Some(result) = self.manager.take_expired_result() else {
            return Ok(None);
        };
        self.record(&result).await?;
        Ok(Some(result))
    }

    /// Recorded attempts for an assessment, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentServiceError::Storage` when the repository fails.
    pub async fn history(
        &self,
        assessment_id: AssessmentId,
    ) -> Result<Vec<AssessmentResult>, AssessmentServiceError> {
        Ok(self.attempts.results_for(assessment_id).await?)
    }

    async fn record(&self, result: &AssessmentResult) -> Result<(), AssessmentServiceError> {
        self.attempts.upsert_definition(result.definition()).await?;
        self.attempts.append_result(result).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gating_reports_remaining_attempts() {
        let def = AssessmentDefinition::new(AssessmentId::new(3), "Gate", "", 1, 50, 1, 2).unwrap();
        assert_eq!(ensure_attempts_remaining(&def).unwrap(), 2);

        let spent = def.with_attempts(2);
        let err = ensure_attempts_remaining(&spent).unwrap_err();
        assert!(matches!(
            err,
            AssessmentServiceError::AttemptsExhausted { max: 2, .. }
        ));
    }
}
