use chrono::{DateTime, Utc};

use assess_core::grading::{self, Grader};
use assess_core::model::{
    AnswerSheet, AssessmentDefinition, AssessmentResult, AssessmentStatus, Question,
};

use super::progress::SessionProgress;

/// Mutable state of the one in-progress attempt.
#[derive(Debug, Clone)]
pub(crate) struct SessionState {
    pub(crate) definition: AssessmentDefinition,
    pub(crate) questions: Vec<Question>,
    pub(crate) answers: AnswerSheet,
    pub(crate) current: usize,
    pub(crate) remaining_seconds: u32,
    pub(crate) active: bool,
    pub(crate) started_at: DateTime<Utc>,
}

impl SessionState {
    pub(crate) fn new(
        definition: &AssessmentDefinition,
        mut questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let limit = usize::try_from(definition.question_count()).unwrap_or(usize::MAX);
        questions.truncate(limit);

        Self {
            definition: definition.begin(),
            answers: AnswerSheet::new(questions.len()),
            questions,
            current: 0,
            remaining_seconds: definition.time_limit_secs(),
            active: true,
            started_at,
        }
    }

    fn last_index(&self) -> usize {
        self.answers.len().saturating_sub(1)
    }

    pub(crate) fn next(&mut self) {
        if self.current < self.last_index() {
            self.current += 1;
        }
    }

    pub(crate) fn previous(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    pub(crate) fn go_to(&mut self, index: usize) {
        self.current = index.min(self.last_index());
    }

    /// Decrements the countdown. Returns true when this tick reached zero.
    pub(crate) fn tick(&mut self) -> bool {
        if self.remaining_seconds == 0 {
            return false;
        }
        self.remaining_seconds -= 1;
        self.remaining_seconds == 0
    }

    /// Grades the sheet and closes the attempt.
    ///
    /// `timed_out` replaces the pass/fail status with `TimedOut`.
    pub(crate) fn finalize(
        self,
        grader: &dyn Grader,
        submitted_at: DateTime<Utc>,
        timed_out: bool,
    ) -> AssessmentResult {
        let outcome = grading::grade(&self.questions, &self.answers, grader);
        let status = if timed_out {
            AssessmentStatus::TimedOut
        } else if grading::passed(outcome.score, self.definition.passing_score()) {
            AssessmentStatus::Passed
        } else {
            AssessmentStatus::Failed
        };

        AssessmentResult::new(
            self.definition.conclude(outcome.score, status),
            self.answers,
            outcome.correct,
            outcome.total,
            self.started_at,
            submitted_at,
        )
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            definition: self.definition.clone(),
            questions: self.questions.clone(),
            answers: self.answers.clone(),
            current_question_index: self.current,
            remaining_seconds: self.remaining_seconds,
            active: self.active,
            started_at: self.started_at,
        }
    }
}

/// Read-only copy of the session for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub definition: AssessmentDefinition,
    pub questions: Vec<Question>,
    pub answers: AnswerSheet,
    pub current_question_index: usize,
    pub remaining_seconds: u32,
    pub active: bool,
    pub started_at: DateTime<Utc>,
}

impl SessionSnapshot {
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_question_index)
    }

    #[must_use]
    pub fn current_answer(&self) -> Option<usize> {
        self.answers.get(self.current_question_index)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.answers.len(),
            answered: self.answers.answered_count(),
            current_index: self.current_question_index,
            remaining_seconds: self.remaining_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::grading::AnswerKeyGrader;
    use assess_core::model::{AssessmentId, QuestionId};
    use assess_core::time::fixed_now;

    fn definition(question_count: u32) -> AssessmentDefinition {
        AssessmentDefinition::new(AssessmentId::new(1), "Intro", "", question_count, 50, 1, 3)
            .unwrap()
    }

    fn questions(n: u64) -> Vec<Question> {
        (1..=n)
            .map(|id| {
                Question::new(
                    QuestionId::new(id),
                    format!("Q{id}"),
                    vec!["a".into(), "b".into()],
                    1,
                    "",
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn truncates_to_question_count() {
        let state = SessionState::new(&definition(2), questions(5), fixed_now());
        assert_eq!(state.questions.len(), 2);
        assert_eq!(state.answers.len(), 2);
        assert_eq!(state.definition.status(), AssessmentStatus::InProgress);
    }

    #[test]
    fn tick_stops_at_zero() {
        let mut state = SessionState::new(&definition(1), questions(1), fixed_now());
        assert_eq!(state.remaining_seconds, 60);
        for _ in 0..59 {
            assert!(!state.tick());
        }
        assert!(state.tick());
        assert!(!state.tick());
        assert_eq!(state.remaining_seconds, 0);
    }

    #[test]
    fn navigation_on_empty_sheet_stays_at_zero() {
        let mut state = SessionState::new(&definition(3), Vec::new(), fixed_now());
        state.next();
        state.go_to(4);
        assert_eq!(state.current, 0);
    }

    #[test]
    fn timed_out_finalize_overrides_status() {
        let mut state = SessionState::new(&definition(2), questions(2), fixed_now());
        state.answers.set(0, 1);
        state.answers.set(1, 1);
        let result = state.finalize(&AnswerKeyGrader, fixed_now(), true);
        assert_eq!(result.status(), AssessmentStatus::TimedOut);
        assert_eq!(result.score(), 100);
        assert_eq!(result.attempts(), 1);
    }
}
