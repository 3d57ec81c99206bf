//! Keepalive scheduling.
//!
//! The scheduler owns at most one timer.  The connection starts it on entering
//! OPEN and stops it on CLOSED / ERRORED, so the timer exists exactly while the
//! connection is open.  The scheduler itself never sends anything: the control
//! loop awaits [`KeepaliveScheduler::tick`] and emits the sentinel when it
//! fires.

use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Smallest accepted period; `tokio::time::interval` rejects zero.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Periodic liveness timer with idempotent start/stop.
#[derive(Debug)]
pub struct KeepaliveScheduler {
    period: Duration,
    timer: Option<Interval>,
}

impl KeepaliveScheduler {
    /// Creates an inactive scheduler.  A zero period is raised to 1 ms.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(MIN_PERIOD),
            timer: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_active(&self) -> bool {
        self.timer.is_some()
    }

    /// Starts the timer; the first tick is one full period from now.
    ///
    /// Returns `false` (and changes nothing) if a timer is already running.
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self) -> bool {
        if self.timer.is_some() {
            return false;
        }
        let mut timer = interval_at(Instant::now() + self.period, self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.timer = Some(timer);
        true
    }

    /// Cancels the timer.  Returns `false` if none was running.
    pub fn stop(&mut self) -> bool {
        self.timer.take().is_some()
    }

    /// Resolves at the next deadline.  Never resolves while stopped.
    pub async fn tick(&mut self) {
        match self.timer.as_mut() {
            Some(timer) => {
                timer.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
