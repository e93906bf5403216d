use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Whether the countdown task keeps running after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickFlow {
    Continue,
    Stop,
}

/// Owned handle to a running countdown task. Dropping it cancels the task.
#[derive(Debug)]
pub(crate) struct Countdown {
    handle: JoinHandle<()>,
}

impl Countdown {
    /// Spawns a task calling `on_tick` once per `period`, first after one full period.
    pub(crate) fn spawn<F>(runtime: &Handle, period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> TickFlow + Send + 'static,
    {
        let handle = runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
            loop {
                interval.tick().await;
                if on_tick() == TickFlow::Stop {
                    break;
                }
            }
        });
        Self { handle }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period_until_stopped() {
        let count = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&count);
        let countdown = Countdown::spawn(&Handle::current(), Duration::from_secs(1), move || {
            if seen.fetch_add(1, Ordering::SeqCst) + 1 == 3 {
                TickFlow::Stop
            } else {
                TickFlow::Continue
            }
        });

        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(countdown.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_task() {
        let count = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&count);
        let countdown = Countdown::spawn(&Handle::current(), Duration::from_secs(1), move || {
            seen.fetch_add(1, Ordering::SeqCst);
            TickFlow::Continue
        });

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        drop(countdown);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
