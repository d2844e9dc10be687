use chrono::{DateTime, Utc};
use std::sync::{Mutex, PoisonError};

/// Points awarded for every accepted repetition.
pub const REPETITION_POINTS: u32 = 1;

/// One-time bonus for completing a lesson's initial learning stage.
pub const FIRST_COMPLETION_BONUS: u32 = 50;

/// Sink for point awards. Fire-and-forget: the collaborator owns delivery
/// to the learner's profile and any retry.
pub trait PointsLedger: Send + Sync {
    fn award(&self, amount: u32);
}

/// Collaborator maintaining the learner's practice streak; signalled on
/// every stage advance.
pub trait StreakTracker: Send + Sync {
    fn check_and_update(&self, now: DateTime<Utc>);
}

/// Ledger that records every award, for tests and dry runs.
#[derive(Default)]
pub struct RecordingLedger {
    awards: Mutex<Vec<u32>>,
}

impl RecordingLedger {
    #[must_use]
    pub fn awards(&self) -> Vec<u32> {
        self.awards
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.awards().iter().map(|&a| u64::from(a)).sum()
    }
}

impl PointsLedger for RecordingLedger {
    fn award(&self, amount: u32) {
        self.awards
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(amount);
    }
}

/// Streak tracker that records every check, for tests and dry runs.
#[derive(Default)]
pub struct RecordingStreak {
    checks: Mutex<Vec<DateTime<Utc>>>,
}

impl RecordingStreak {
    #[must_use]
    pub fn checks(&self) -> Vec<DateTime<Utc>> {
        self.checks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StreakTracker for RecordingStreak {
    fn check_and_update(&self, now: DateTime<Utc>) {
        self.checks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drill_core::time::fixed_now;

    #[test]
    fn recording_ledger_accumulates_awards() {
        let ledger = RecordingLedger::default();
        ledger.award(REPETITION_POINTS);
        ledger.award(FIRST_COMPLETION_BONUS);
        assert_eq!(ledger.awards(), vec![1, 50]);
        assert_eq!(ledger.total(), 51);
    }

    #[test]
    fn recording_streak_keeps_timestamps() {
        let streak = RecordingStreak::default();
        streak.check_and_update(fixed_now());
        assert_eq!(streak.checks(), vec![fixed_now()]);
    }
}
