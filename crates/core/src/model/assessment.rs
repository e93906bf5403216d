use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::AssessmentId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AssessmentError {
    #[error("assessment title cannot be empty")]
    EmptyTitle,

    #[error("question count must be > 0")]
    InvalidQuestionCount,

    #[error("passing score must be between 0 and 100, got {0}")]
    InvalidPassingScore(u8),

    #[error("max attempts must be > 0")]
    InvalidMaxAttempts,
}

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Lifecycle status carried on a definition and on submitted results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssessmentStatus {
    #[default]
    NotStarted,
    InProgress,
    Passed,
    Failed,
    /// Finalised by the countdown rather than by the trainee.
    TimedOut,
}

impl AssessmentStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AssessmentStatus::NotStarted => "not-started",
            AssessmentStatus::InProgress => "in-progress",
            AssessmentStatus::Passed => "passed",
            AssessmentStatus::Failed => "failed",
            AssessmentStatus::TimedOut => "timed-out",
        }
    }

    /// Returns true for statuses that close an attempt.
    #[must_use]
    pub fn is_final(self) -> bool {
        matches!(
            self,
            AssessmentStatus::Passed | AssessmentStatus::Failed | AssessmentStatus::TimedOut
        )
    }
}

//
// ─── DEFINITION ────────────────────────────────────────────────────────────────
//

/// Static description of an assessment and its attempt history.
///
/// Only `attempts`, `status` and `score` change over the life of a definition;
/// everything else is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentDefinition {
    id: AssessmentId,
    title: String,
    description: String,
    question_count: u32,
    passing_score: u8,
    time_limit_minutes: u32,
    attempts: u32,
    max_attempts: u32,
    adaptive: bool,
    status: AssessmentStatus,
    score: Option<u8>,
}

impl AssessmentDefinition {
    /// Creates a definition with no attempts taken.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError` if the title is blank, `question_count` or
    /// `max_attempts` is zero, or `passing_score` exceeds 100.
    pub fn new(
        id: AssessmentId,
        title: impl Into<String>,
        description: impl Into<String>,
        question_count: u32,
        passing_score: u8,
        time_limit_minutes: u32,
        max_attempts: u32,
    ) -> Result<Self, AssessmentError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(AssessmentError::EmptyTitle);
        }
        if question_count == 0 {
            return Err(AssessmentError::InvalidQuestionCount);
        }
        if passing_score > 100 {
            return Err(AssessmentError::InvalidPassingScore(passing_score));
        }
        if max_attempts == 0 {
            return Err(AssessmentError::InvalidMaxAttempts);
        }

        Ok(Self {
            id,
            title: title.trim().to_owned(),
            description: description.into(),
            question_count,
            passing_score,
            time_limit_minutes,
            attempts: 0,
            max_attempts,
            adaptive: false,
            status: AssessmentStatus::NotStarted,
            score: None,
        })
    }

    #[must_use]
    pub fn with_adaptive(mut self, adaptive: bool) -> Self {
        self.adaptive = adaptive;
        self
    }

    #[must_use]
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    #[must_use]
    pub fn id(&self) -> AssessmentId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    #[must_use]
    pub fn passing_score(&self) -> u8 {
        self.passing_score
    }

    #[must_use]
    pub fn time_limit_minutes(&self) -> u32 {
        self.time_limit_minutes
    }

    /// Time limit expressed in whole seconds, saturating on overflow.
    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_minutes.saturating_mul(60)
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn is_adaptive(&self) -> bool {
        self.adaptive
    }

    #[must_use]
    pub fn status(&self) -> AssessmentStatus {
        self.status
    }

    #[must_use]
    pub fn score(&self) -> Option<u8> {
        self.score
    }

    #[must_use]
    pub fn attempts_remaining(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts)
    }

    #[must_use]
    pub fn has_attempts_remaining(&self) -> bool {
        self.attempts_remaining() > 0
    }

    /// Copy of this definition marked as in progress.
    #[must_use]
    pub fn begin(&self) -> Self {
        Self {
            status: AssessmentStatus::InProgress,
            score: None,
            ..self.clone()
        }
    }

    /// Copy of this definition closed with the given score and status, with
    /// one more attempt recorded.
    #[must_use]
    pub fn conclude(&self, score: u8, status: AssessmentStatus) -> Self {
        Self {
            score: Some(score),
            status,
            attempts: self.attempts.saturating_add(1),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(question_count: u32, passing_score: u8) -> Result<AssessmentDefinition, AssessmentError> {
        AssessmentDefinition::new(
            AssessmentId::new(1),
            "Safety Basics",
            "Warehouse safety induction",
            question_count,
            passing_score,
            10,
            3,
        )
    }

    #[test]
    fn rejects_invalid_definitions() {
        assert_eq!(build(0, 50).unwrap_err(), AssessmentError::InvalidQuestionCount);
        assert_eq!(build(5, 101).unwrap_err(), AssessmentError::InvalidPassingScore(101));
        let blank = AssessmentDefinition::new(AssessmentId::new(1), "  ", "", 1, 50, 1, 1);
        assert_eq!(blank.unwrap_err(), AssessmentError::EmptyTitle);
        let no_attempts = AssessmentDefinition::new(AssessmentId::new(1), "T", "", 1, 50, 1, 0);
        assert_eq!(no_attempts.unwrap_err(), AssessmentError::InvalidMaxAttempts);
    }

    #[test]
    fn conclude_increments_attempts_and_keeps_identity() {
        let def = build(5, 70).unwrap().with_attempts(1);
        let concluded = def.begin().conclude(80, AssessmentStatus::Passed);

        assert_eq!(concluded.attempts(), 2);
        assert_eq!(concluded.score(), Some(80));
        assert_eq!(concluded.status(), AssessmentStatus::Passed);
        assert_eq!(concluded.id(), def.id());
        assert_eq!(concluded.question_count(), def.question_count());
    }

    #[test]
    fn begin_clears_previous_score() {
        let concluded = build(5, 70).unwrap().conclude(40, AssessmentStatus::Failed);
        let reopened = concluded.begin();

        assert_eq!(reopened.score(), None);
        assert_eq!(reopened.status(), AssessmentStatus::InProgress);
        assert_eq!(reopened.attempts(), 1);
    }

    #[test]
    fn attempts_remaining_saturates() {
        let def = build(5, 70).unwrap().with_attempts(5);
        assert_eq!(def.attempts_remaining(), 0);
        assert!(!def.has_attempts_remaining());
    }

    #[test]
    fn time_limit_converts_to_seconds() {
        let def = build(2, 50).unwrap();
        assert_eq!(def.time_limit_secs(), 600);
    }
}
