use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};

/// The recurring unread-count timer.
///
/// Owned by the engine run loop; at most one interval exists at a time and it
/// is dropped with the timer on every exit path.
pub struct PollTimer {
    period: Duration,
    interval: Option<Interval>,
}

impl PollTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            interval: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_active(&self) -> bool {
        self.interval.is_some()
    }

    /// Arm the timer. Returns `false` (and leaves the running timer alone)
    /// when one is already active.
    ///
    /// The first tick fires one full period after arming. Must be called from
    /// within a Tokio runtime.
    pub fn start(&mut self) -> bool {
        if self.interval.is_some() {
            return false;
        }
        let mut interval = tokio::time::interval_at(Instant::now() + self.period, self.period);
        // Laptop sleep or a stalled loop must not produce a burst of polls.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
        true
    }

    /// Disarm the timer. Returns `false` when nothing was active.
    pub fn stop(&mut self) -> bool {
        self.interval.take().is_some()
    }

    /// Wait for the next tick. Never completes while the timer is stopped.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn start_is_idempotent() {
        let mut timer = PollTimer::new(Duration::from_secs(30));
        assert!(!timer.is_active());
        assert!(timer.start());
        assert!(!timer.start());
        assert!(timer.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_twice_is_a_no_op() {
        let mut timer = PollTimer::new(Duration::from_secs(30));
        timer.start();
        assert!(timer.stop());
        assert!(!timer.stop());
        assert!(!timer.is_active());
        assert!(timer.start());
        assert!(timer.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_after_one_period() {
        let mut timer = PollTimer::new(Duration::from_secs(30));
        timer.start();
        let before = Instant::now();
        timer.tick().await;
        assert!(Instant::now() - before >= Duration::from_secs(30));
        timer.tick().await;
        assert!(Instant::now() - before >= Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_timer_never_ticks() {
        let mut timer = PollTimer::new(Duration::from_secs(1));
        let waited = tokio::time::timeout(Duration::from_secs(10), timer.tick()).await;
        assert!(waited.is_err());
    }
}
