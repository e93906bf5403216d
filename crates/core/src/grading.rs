use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{AnswerSheet, Question};

//
// ─── SCORING ───────────────────────────────────────────────────────────────────
//

/// Percentage of `correct` over `total`, rounded half away from zero.
///
/// Returns `0` when `total` is zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn score_percent(correct: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let ratio = f64::from(correct.min(total)) / f64::from(total);
    (ratio * 100.0).round() as u8
}

/// Pass rule: a score at or above the threshold passes.
#[must_use]
pub fn passed(score: u8, passing_score: u8) -> bool {
    score >= passing_score
}

//
// ─── GRADERS ───────────────────────────────────────────────────────────────────
//

/// Decides whether a selected option counts as correct.
///
/// Only answered slots reach a grader; unanswered slots are always wrong.
pub trait Grader: Send + Sync {
    fn is_correct(&self, question: &Question, answer: usize) -> bool;
}

/// Compares the selected option with the question's answer key.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnswerKeyGrader;

impl Grader for AnswerKeyGrader {
    fn is_correct(&self, question: &Question, answer: usize) -> bool {
        answer == question.correct_answer()
    }
}

/// Placeholder grader that ignores the answer key and marks each answered
/// slot correct with a fixed probability.
pub struct RandomGrader {
    probability: f64,
    rng: Mutex<StdRng>,
}

impl RandomGrader {
    pub const DEFAULT_PROBABILITY: f64 = 0.7;

    /// Creates a grader seeded from the OS. `probability` is clamped to `[0, 1]`.
    #[must_use]
    pub fn new(probability: f64) -> Self {
        Self::with_rng(probability, StdRng::from_os_rng())
    }

    /// Creates a reproducible grader for tests and demos.
    #[must_use]
    pub fn seeded(probability: f64, seed: u64) -> Self {
        Self::with_rng(probability, StdRng::seed_from_u64(seed))
    }

    fn with_rng(probability: f64, rng: StdRng) -> Self {
        let probability = if probability.is_finite() {
            probability.clamp(0.0, 1.0)
        } else {
            Self::DEFAULT_PROBABILITY
        };
        Self {
            probability,
            rng: Mutex::new(rng),
        }
    }

    #[must_use]
    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl Default for RandomGrader {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PROBABILITY)
    }
}

impl std::fmt::Debug for RandomGrader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomGrader")
            .field("probability", &self.probability)
            .finish_non_exhaustive()
    }
}

impl Grader for RandomGrader {
    fn is_correct(&self, _question: &Question, _answer: usize) -> bool {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.random_bool(self.probability)
    }
}

//
// ─── GRADE OUTCOME ─────────────────────────────────────────────────────────────
//

/// Totals produced by grading an answer sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeOutcome {
    pub correct: u32,
    pub total: u32,
    pub score: u8,
}

/// Grades `answers` against `questions` slot by slot.
///
/// `total` is the number of slots on the sheet; slots without a matching
/// question count as wrong.
#[must_use]
pub fn grade(questions: &[Question], answers: &AnswerSheet, grader: &dyn Grader) -> GradeOutcome {
    let correct = answers
        .iter()
        .enumerate()
        .filter(|(index, slot)| match (slot, questions.get(*index)) {
            (Some(answer), Some(question)) => grader.is_correct(question, *answer),
            _ => false,
        })
        .count();

    let total = u32::try_from(answers.len()).unwrap_or(u32::MAX);
    let correct = u32::try_from(correct).unwrap_or(u32::MAX);

    GradeOutcome {
        correct,
        total,
        score: score_percent(correct, total),
    }
}
