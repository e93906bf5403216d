use std::time::Duration;

/// What happens when the countdown reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeoutPolicy {
    /// Stop counting and leave the session open until it is submitted.
    #[default]
    Continue,
    /// Finalise the session with status `TimedOut`.
    AutoSubmit,
}

impl TimeoutPolicy {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "continue" => Some(Self::Continue),
            "auto-submit" | "auto_submit" | "autosubmit" => Some(Self::AutoSubmit),
            _ => None,
        }
    }
}

/// Tunables for `AssessmentSessionManager`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerConfig {
    timeout_policy: TimeoutPolicy,
    tick: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            timeout_policy: TimeoutPolicy::default(),
            tick: Duration::from_secs(1),
        }
    }
}

impl ManagerConfig {
    #[must_use]
    pub fn with_timeout_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.timeout_policy = policy;
        self
    }

    /// Interval between countdown ticks. A zero duration falls back to one second.
    #[must_use]
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = if tick.is_zero() {
            Duration::from_secs(1)
        } else {
            tick
        };
        self
    }

    #[must_use]
    pub fn timeout_policy(&self) -> TimeoutPolicy {
        self.timeout_policy
    }

    #[must_use]
    pub fn tick(&self) -> Duration {
        self.tick
    }
}
