use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{AnswerSheet, AssessmentDefinition, AssessmentStatus};
use crate::time::elapsed_secs;

/// Outcome of a finished attempt.
///
/// `definition` is the attempted definition with `score` and `status` filled
/// in and `attempts` already incremented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentResult {
    definition: AssessmentDefinition,
    answers: AnswerSheet,
    correct_count: u32,
    total_questions: u32,
    started_at: DateTime<Utc>,
    submitted_at: DateTime<Utc>,
}

impl AssessmentResult {
    #[must_use]
    pub fn new(
        definition: AssessmentDefinition,
        answers: AnswerSheet,
        correct_count: u32,
        total_questions: u32,
        started_at: DateTime<Utc>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            definition,
            answers,
            correct_count,
            total_questions,
            started_at,
            submitted_at,
        }
    }

    #[must_use]
    pub fn definition(&self) -> &AssessmentDefinition {
        &self.definition
    }

    #[must_use]
    pub fn into_definition(self) -> AssessmentDefinition {
        self.definition
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    #[must_use]
    pub fn score(&self) -> u8 {
        self.definition.score().unwrap_or(0)
    }

    #[must_use]
    pub fn status(&self) -> AssessmentStatus {
        self.definition.status()
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.definition.attempts()
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.status() == AssessmentStatus::Passed
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// Seconds between start and submission.
    #[must_use]
    pub fn elapsed_secs(&self) -> u64 {
        elapsed_secs(self.started_at, self.submitted_at)
    }
}
