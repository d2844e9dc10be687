use chrono::{DateTime, Utc};

use crate::model::LessonProgress;
use crate::stages::StageTable;

//
// ─── LESSON STATUS ─────────────────────────────────────────────────────────────
//

/// Time-gated availability of a lesson, derived on demand and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonStatus {
    /// Stage 0: repetitions are always available, no lock window applies.
    Learning { stage: usize },
    /// Lock window elapsed; the current stage's repetitions are due.
    Active { stage: usize },
    /// Lock window still running; `due` is when it opens.
    Locked { stage: usize, due: DateTime<Utc> },
    /// Terminal stage; no further practice is ever scheduled.
    Mastered { stage: usize },
}

impl LessonStatus {
    #[must_use]
    pub fn stage(&self) -> usize {
        match *self {
            Self::Learning { stage }
            | Self::Active { stage }
            | Self::Locked { stage, .. }
            | Self::Mastered { stage } => stage,
        }
    }

    /// When the lock window opens, for countdown display. Only `Locked`
    /// reports one.
    #[must_use]
    pub fn due(&self) -> Option<DateTime<Utc>> {
        match *self {
            Self::Locked { due, .. } => Some(due),
            _ => None,
        }
    }

    /// Whether repetitions can be submitted right now.
    #[must_use]
    pub fn is_practicable(&self) -> bool {
        matches!(self, Self::Learning { .. } | Self::Active { .. })
    }
}

//
// ─── RESOLUTION ────────────────────────────────────────────────────────────────
//

/// Resolves a lesson's availability from its progress record and the stage
/// table. Pure; `now` is the only temporal input.
///
/// * No record, or stage 0 → `Learning` (immediately practicable).
/// * Terminal stage → `Mastered`.
/// * Otherwise the current stage's own interval, counted from
///   `last_completion`, gates the window: elapsed → `Active`, still running
///   → `Locked` with the due instant.
///
/// A mid-table record without a completion stamp cannot be produced by the
/// mutator; if one is encountered it resolves as due immediately.
#[must_use]
pub fn resolve_status(
    progress: Option<&LessonProgress>,
    stages: &StageTable,
    now: DateTime<Utc>,
) -> LessonStatus {
    let Some(progress) = progress else {
        return LessonStatus::Learning { stage: 0 };
    };
    if progress.stage == 0 {
        return LessonStatus::Learning { stage: 0 };
    }
    if stages.is_terminal(progress.stage) {
        return LessonStatus::Mastered {
            stage: progress.stage,
        };
    }

    let window = progress
        .last_completion
        .zip(stages.stage_at(progress.stage).interval());
    match window {
        Some((completed_at, interval)) => {
            let due = completed_at + interval;
            if now >= due {
                LessonStatus::Active {
                    stage: progress.stage,
                }
            } else {
                LessonStatus::Locked {
                    stage: progress.stage,
                    due,
                }
            }
        }
        None => LessonStatus::Active {
            stage: progress.stage,
        },
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Lesson, Sentence, SentenceId};
    use crate::time::fixed_now;
    use chrono::Duration;

    fn build_lesson() -> Lesson {
        Lesson::new(
            "Greetings",
            vec![Sentence::new(SentenceId::new("s1"), "Hello.", "مرحبا")],
        )
    }

    fn progress_at(stage: usize, completed_at: Option<DateTime<Utc>>) -> LessonProgress {
        let mut progress = LessonProgress::new_for(&build_lesson());
        progress.stage = stage;
        progress.last_completion = completed_at;
        progress
    }

    #[test]
    fn absent_record_is_learning() {
        let status = resolve_status(None, &StageTable::default(), fixed_now());
        assert_eq!(status, LessonStatus::Learning { stage: 0 });
        assert!(status.is_practicable());
    }

    #[test]
    fn stage_zero_is_learning_regardless_of_time() {
        let table = StageTable::default();
        let progress = progress_at(0, None);
        let far_future = fixed_now() + Duration::days(365);
        assert_eq!(
            resolve_status(Some(&progress), &table, far_future),
            LessonStatus::Learning { stage: 0 }
        );
    }

    #[test]
    fn terminal_stage_is_mastered() {
        let table = StageTable::default();
        let progress = progress_at(table.last_index(), Some(fixed_now()));
        let status = resolve_status(Some(&progress), &table, fixed_now());
        assert_eq!(
            status,
            LessonStatus::Mastered {
                stage: table.last_index()
            }
        );
        assert!(!status.is_practicable());
    }

    #[test]
    fn mid_stage_locks_until_its_own_interval_elapses() {
        // Stage 1 carries a 1-day interval in the default table.
        let table = StageTable::default();
        let t0 = fixed_now();
        let progress = progress_at(1, Some(t0));

        let half_day_in = t0 + Duration::hours(12);
        let status = resolve_status(Some(&progress), &table, half_day_in);
        assert_eq!(
            status,
            LessonStatus::Locked {
                stage: 1,
                due: t0 + Duration::days(1)
            }
        );
        assert_eq!(status.due(), Some(t0 + Duration::days(1)));

        let on_the_boundary = t0 + Duration::days(1);
        assert_eq!(
            resolve_status(Some(&progress), &table, on_the_boundary),
            LessonStatus::Active { stage: 1 }
        );
    }

    #[test]
    fn mid_stage_without_stamp_resolves_as_due() {
        let table = StageTable::default();
        let progress = progress_at(2, None);
        assert_eq!(
            resolve_status(Some(&progress), &table, fixed_now()),
            LessonStatus::Active { stage: 2 }
        );
    }

    #[test]
    fn every_reachable_stage_resolves_to_exactly_one_kind() {
        let table = StageTable::default();
        let now = fixed_now();
        for stage in 0..=table.last_index() {
            for stamp in [None, Some(now - Duration::hours(1))] {
                let progress = progress_at(stage, stamp);
                let status = resolve_status(Some(&progress), &table, now);
                assert_eq!(status.stage(), stage);
                match status {
                    LessonStatus::Learning { .. } => assert_eq!(stage, 0),
                    LessonStatus::Mastered { .. } => assert_eq!(stage, table.last_index()),
                    LessonStatus::Active { .. } | LessonStatus::Locked { .. } => {
                        assert!(stage > 0 && stage < table.last_index());
                    }
                }
            }
        }
    }
}
