use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use assess_core::grading::{AnswerKeyGrader, Grader};
use assess_core::model::{AssessmentDefinition, AssessmentResult, Question};

use super::config::{ManagerConfig, TimeoutPolicy};
use super::countdown::{Countdown, TickFlow};
use super::state::{SessionSnapshot, SessionState};
use crate::Clock;

//
// ─── SHARED STATE ──────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct Shared {
    session: Option<SessionState>,
    /// Bumped on every start and submit so stale countdowns stop touching state.
    generation: u64,
    countdown: Option<Countdown>,
    expired: Option<AssessmentResult>,
}

struct Inner {
    shared: Mutex<Shared>,
    grader: Arc<dyn Grader>,
    clock: Clock,
    config: ManagerConfig,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tick(&self, generation: u64) -> TickFlow {
        let mut shared = self.lock();
        if shared.generation != generation {
            return TickFlow::Stop;
        }
        let Some(state) = shared.session.as_mut() else {
            return TickFlow::Stop;
        };
        if state.remaining_seconds == 0 {
            return TickFlow::Stop;
        }
        if !state.tick() {
            return TickFlow::Continue;
        }

        let assessment_id = state.definition.id();
        match self.config.timeout_policy() {
            TimeoutPolicy::Continue => {
                info!(%assessment_id, "countdown reached zero, session left open");
            }
            TimeoutPolicy::AutoSubmit => {
                if let Some(state) = shared.session.take() {
                    let result = state.finalize(self.grader.as_ref(), self.clock.now(), true);
                    warn!(
                        %assessment_id,
                        score = result.score(),
                        attempts = result.attempts(),
                        "countdown reached zero, session auto-submitted"
                    );
                    shared.expired = Some(result);
                    shared.generation = shared.generation.wrapping_add(1);
                }
            }
        }
        TickFlow::Stop
    }
}

//
// ─── MANAGER ───────────────────────────────────────────────────────────────────
//

/// Runs one timed assessment attempt at a time.
///
/// All operations take `&self`; the manager can be shared behind an `Arc`
/// between the presentation layer and the countdown task. Mutators called
/// without an active session are no-ops.
#[derive(Clone)]
pub struct AssessmentSessionManager {
    inner: Arc<Inner>,
}

impl Default for AssessmentSessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AssessmentSessionManager {
    /// Manager grading against each question's answer key.
    #[must_use]
    pub fn new() -> Self {
        Self::with_grader(Arc::new(AnswerKeyGrader))
    }

    #[must_use]
    pub fn with_grader(grader: Arc<dyn Grader>) -> Self {
        Self::build(grader, Clock::default(), ManagerConfig::default())
    }

    #[must_use]
    pub fn build(grader: Arc<dyn Grader>, clock: Clock, config: ManagerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                shared: Mutex::new(Shared::default()),
                grader,
                clock,
                config,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> ManagerConfig {
        self.inner.config
    }

    /// Starts a new attempt, replacing any session already running.
    ///
    /// `questions` is the question source's canonical ordering; only the
    /// first `question_count` are used. The countdown runs on the current
    /// tokio runtime when there is one; otherwise call [`tick`](Self::tick).
    pub fn start_assessment(&self, definition: &AssessmentDefinition, questions: Vec<Question>) {
        let state = SessionState::new(definition, questions, self.inner.clock.now());
        let question_total = state.answers.len();
        let remaining_seconds = state.remaining_seconds;

        let mut shared = self.inner.lock();
        if let Some(previous) = shared.session.take() {
            debug!(
                replaced = %previous.definition.id(),
                "discarding previous session"
            );
        }
        // Cancel before the new timer exists so two countdowns never overlap.
        shared.countdown = None;
        // A pending timed-out result is kept until someone takes it.
        shared.generation = shared.generation.wrapping_add(1);
        let generation = shared.generation;
        shared.session = Some(state);

        if let Ok(runtime) = Handle::try_current() {
            let weak = Arc::downgrade(&self.inner);
            shared.countdown = Some(Countdown::spawn(
                &runtime,
                self.inner.config.tick(),
                move || match weak.upgrade() {
                    Some(inner) => inner.tick(generation),
                    None => TickFlow::Stop,
                },
            ));
        } else {
            debug!("no async runtime, countdown must be ticked manually");
        }
        drop(shared);

        info!(
            assessment_id = %definition.id(),
            questions = question_total,
            remaining_seconds,
            adaptive = definition.is_adaptive(),
            "assessment started"
        );
    }

    /// Records `option_index` for `question_index`, overwriting any earlier answer.
    ///
    /// The option index is not checked against the question's options.
    pub fn answer_question(&self, question_index: usize, option_index: usize) {
        let mut shared = self.inner.lock();
        let Some(state) = shared.session.as_mut() else {
            return;
        };
        if state.answers.set(question_index, option_index) {
            debug!(question_index, option_index, "answer recorded");
        } else {
            debug!(question_index, "answer ignored, question index out of range");
        }
    }

    pub fn next_question(&self) {
        if let Some(state) = self.inner.lock().session.as_mut() {
            state.next();
        }
    }

    pub fn previous_question(&self) {
        if let Some(state) = self.inner.lock().session.as_mut() {
            state.previous();
        }
    }

    /// Jumps to `index`, clamped to the last question.
    pub fn go_to_question(&self, index: usize) {
        if let Some(state) = self.inner.lock().session.as_mut() {
            state.go_to(index);
        }
    }

    /// Grades and ends the session. Returns `None` when no session is active.
    pub fn submit_assessment(&self) -> Option<AssessmentResult> {
        let mut shared = self.inner.lock();
        let state = shared.session.take()?;
        shared.countdown = None;
        shared.generation = shared.generation.wrapping_add(1);
        drop(shared);

        let result = state.finalize(self.inner.grader.as_ref(), self.inner.clock.now(), false);
        info!(
            assessment_id = %result.definition().id(),
            score = result.score(),
            status = result.status().as_str(),
            correct = result.correct_count(),
            total = result.total_questions(),
            attempts = result.attempts(),
            "assessment submitted"
        );
        Some(result)
    }

    /// Applies one countdown step by hand.
    ///
    /// Returns the remaining seconds, or `None` if no session is active
    /// (including one just auto-submitted by this tick).
    pub fn tick(&self) -> Option<u32> {
        let generation = self.inner.lock().generation;
        self.inner.tick(generation);
        self.remaining_seconds()
    }

    /// Result of a session the countdown finalised, if not yet collected.
    pub fn take_expired_result(&self) -> Option<AssessmentResult> {
        self.inner.lock().expired.take()
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.inner.lock().session.as_ref().map(SessionState::snapshot)
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner
            .lock()
            .session
            .as_ref()
            .is_some_and(|state| state.active)
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> Option<u32> {
        self.inner
            .lock()
            .session
            .as_ref()
            .map(|state| state.remaining_seconds)
    }

    #[must_use]
    pub fn current_question_index(&self) -> Option<usize> {
        self.inner.lock().session.as_ref().map(|state| state.current)
    }

    #[must_use]
    pub fn answers(&self) -> Option<Vec<Option<usize>>> {
        self.inner
            .lock()
            .session
            .as_ref()
            .map(|state| state.answers.as_slice().to_vec())
    }
}

impl fmt::Debug for AssessmentSessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.inner.lock();
        f.debug_struct("AssessmentSessionManager")
            .field(
                "assessment_id",
                &shared.session.as_ref().map(|s| s.definition.id()),
            )
            .field("generation", &shared.generation)
            .field("countdown_running", &shared.countdown.as_ref().is_some_and(|c| !c.is_finished()))
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
