//! Time budget for the bounded checks.

use std::time::Duration;

/// Two-tier time limit for an exhaustive check.
///
/// - `budget` is compared with the elapsed time before every truth-table row.
/// - `deadline_secs` arms a watchdog (whole seconds) that cancels the check
///   even in the middle of a row.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use taut_rs::config::TimeBudget;
///
/// let budget = TimeBudget::from_secs(10);
/// assert_eq!(budget.budget, Duration::from_secs(10));
/// assert_eq!(budget.deadline_secs, 10);
///
/// let budget = TimeBudget::default().with_budget(Duration::from_millis(250));
/// assert_eq!(budget.deadline_secs, 30);
/// ```
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct TimeBudget {
    /// Polled between rows (default: 30 s)
    pub budget: Duration,
    /// Hard deadline for the watchdog, in seconds (default: 30)
    pub deadline_secs: u64,
}

impl TimeBudget {
    pub const DEFAULT_SECS: u64 = 30;

    /// Same limit for both tiers.
    pub fn from_secs(secs: u64) -> Self {
        Self {
            budget: Duration::from_secs(secs),
            deadline_secs: secs,
        }
    }

    pub fn with_budget(self, budget: Duration) -> Self {
        Self { budget, ..self }
    }

    pub fn with_deadline_secs(self, deadline_secs: u64) -> Self {
        Self {
            deadline_secs,
            ..self
        }
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

impl Default for TimeBudget {
    fn default() -> Self {
        Self::from_secs(Self::DEFAULT_SECS)
    }
}
