//! Timing attack protection utilities
//!
//! Login for an unknown user skips password hashing and would otherwise return
//! measurably faster than a wrong password for a real user.

use std::time::{Duration, Instant};

/// Holds a login attempt open until a minimum wall time has passed
pub struct AuthTimer {
    start: Instant,
    min_duration: Duration,
}

impl AuthTimer {
    /// Starts the clock now
    pub fn new(min_duration: Duration) -> Self {
        Self {
            start: Instant::now(),
            min_duration,
        }
    }

    /// Time still owed before the floor is reached
    fn remaining(&self) -> Option<Duration> {
        self.min_duration
            .checked_sub(self.start.elapsed())
            .filter(|left| !left.is_zero())
    }

    /// Sleeps out whatever is left of the floor
    pub async fn wait(self) {
        if let Some(left) = self.remaining() {
            tokio::time::sleep(left).await;
        }
    }
}
