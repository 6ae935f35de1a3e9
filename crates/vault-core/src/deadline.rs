//! Whole-run deadline

use std::time::{Duration, Instant};

/// Point in time after which no new document is started
#[derive(Debug, Clone, Copy, Default)]
pub struct RunDeadline {
    at: Option<Instant>,
}

impl RunDeadline {
    /// Deadline `timeout` from now; `None` never expires
    #[must_use]
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            at: timeout.and_then(|t| Instant::now().checked_add(t)),
        }
    }

    /// Deadline that never expires
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn expired(&self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }

    /// Time left; `None` without a deadline
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.at.map(|at| at.saturating_duration_since(Instant::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_never_expires() {
        assert!(!RunDeadline::none().expired());
        assert!(RunDeadline::new(None).remaining().is_none());
    }

    #[test]
    fn zero_timeout_expires_immediately() {
        let deadline = RunDeadline::new(Some(Duration::ZERO));
        assert!(deadline.expired());
        assert_eq!(deadline.remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn long_timeout_not_expired() {
        assert!(!RunDeadline::new(Some(Duration::from_secs(3600))).expired());
    }
}
