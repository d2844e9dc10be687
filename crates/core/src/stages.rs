use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StageTableError {
    #[error("stage table needs at least a learning and a mastered entry, got {provided}")]
    TooShort { provided: usize },
    #[error("terminal stage must not require repetitions, got {reps}")]
    TerminalRequiresReps { reps: u32 },
    #[error("terminal stage must not carry a review interval")]
    TerminalHasInterval,
}

//
// ─── STAGE ─────────────────────────────────────────────────────────────────────
//

/// One rung of the SRS progression.
///
/// `interval_days` is the lock window that gates this stage's practice,
/// counted from the previous stage completion; `None` means the stage never
/// re-enters practice (terminal "mastered" entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrsStage {
    pub name: String,
    pub interval_days: Option<u32>,
    pub reps_required: u32,
}

impl SrsStage {
    #[must_use]
    pub fn new(name: impl Into<String>, interval_days: Option<u32>, reps_required: u32) -> Self {
        Self {
            name: name.into(),
            interval_days,
            reps_required,
        }
    }

    /// The lock window as a duration, if the stage has one.
    #[must_use]
    pub fn interval(&self) -> Option<Duration> {
        self.interval_days.map(|d| Duration::days(i64::from(d)))
    }
}

//
// ─── STAGE TABLE ───────────────────────────────────────────────────────────────
//

/// The fixed, ordered SRS progression. Index 0 is the initial learning
/// stage; the last index is terminal. Hand-authored data, no adaptive
/// scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTable {
    stages: Vec<SrsStage>,
}

impl StageTable {
    /// Validates and wraps a hand-authored progression.
    ///
    /// # Errors
    ///
    /// - `TooShort` if fewer than two entries are provided
    /// - `TerminalRequiresReps` if the last entry requires repetitions
    /// - `TerminalHasInterval` if the last entry carries a finite interval
    pub fn new(stages: Vec<SrsStage>) -> Result<Self, StageTableError> {
        if stages.len() < 2 {
            return Err(StageTableError::TooShort {
                provided: stages.len(),
            });
        }
        let terminal = stages.last().expect("length checked above");
        if terminal.reps_required != 0 {
            return Err(StageTableError::TerminalRequiresReps {
                reps: terminal.reps_required,
            });
        }
        if terminal.interval_days.is_some() {
            return Err(StageTableError::TerminalHasInterval);
        }
        Ok(Self { stages })
    }

    /// Index of the terminal "mastered" stage.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.stages.len() - 1
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SrsStage> {
        self.stages.get(index)
    }

    /// Stage at `index`.
    ///
    /// Callers hold the `LessonProgress` invariant `stage <= last_index`;
    /// use [`StageTable::get`] for untrusted indices.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[must_use]
    pub fn stage_at(&self, index: usize) -> &SrsStage {
        &self.stages[index]
    }

    #[must_use]
    pub fn is_terminal(&self, index: usize) -> bool {
        index >= self.last_index()
    }

    #[must_use]
    pub fn stages(&self) -> &[SrsStage] {
        &self.stages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Default for StageTable {
    /// The production six-stage progression: a heavy initial learning stage,
    /// then reviews at widening intervals until mastered.
    fn default() -> Self {
        Self::new(vec![
            SrsStage::new("learning", Some(1), 6),
            SrsStage::new("next-day review", Some(1), 4),
            SrsStage::new("third-day review", Some(7), 3),
            SrsStage::new("weekly review", Some(19), 2),
            SrsStage::new("monthly review", Some(30), 2),
            SrsStage::new("mastered", None, 0),
        ])
        .expect("default stage table should be valid")
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
