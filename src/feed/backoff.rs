//! Reconnection delay schedule for the feed subscription.

use std::time::Duration;

/// Default initial reconnection delay.
pub const INITIAL_DELAY: Duration = Duration::from_millis(500);

/// Default maximum reconnection delay.
pub const MAX_DELAY: Duration = Duration::from_millis(2000);

/// Exponential backoff state: the delay doubles on each consecutive failure,
/// clamped at a maximum, and resets to the initial delay on a successful
/// open.
///
/// No jitter; the current delay is shown verbatim on the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    next: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            next: initial,
        }
    }

    /// Consume the current delay and double the next one (clamped).
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.next;
        self.next = (delay * 2).min(self.max);
        delay
    }

    /// Back to the initial delay. Called on a successful open and when the
    /// endpoint changes.
    pub fn reset(&mut self) {
        self.next = self.initial;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(INITIAL_DELAY, MAX_DELAY)
    }
}
