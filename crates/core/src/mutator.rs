use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{Lesson, LessonProgress, SentenceId};
use crate::stages::StageTable;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepetitionError {
    /// The lesson sits at the terminal stage; its record no longer changes.
    #[error("lesson is already mastered")]
    TerminalStage,
    /// The submitted sentence is not part of the lesson.
    #[error("sentence {0} is not part of the lesson")]
    UnknownSentence(SentenceId),
    /// The sentence already met the stage requirement; the session the
    /// caller is driving is out of sync with the record.
    #[error("sentence {id} already met the stage requirement of {required} repetitions")]
    RepetitionOverflow { id: SentenceId, required: u32 },
}

//
// ─── OUTCOME ───────────────────────────────────────────────────────────────────
//

/// Stage transition produced by a completed repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageAdvance {
    pub from: usize,
    pub to: usize,
    /// True when the advance left the initial learning stage; this is the
    /// transition that earns the one-time completion bonus.
    pub first_completion: bool,
}

/// Updated record plus the advance, if this repetition completed the stage.
#[derive(Debug, Clone, PartialEq)]
pub struct RepetitionOutcome {
    pub progress: LessonProgress,
    pub advance: Option<StageAdvance>,
}

//
// ─── MUTATION ──────────────────────────────────────────────────────────────────
//

/// Applies one completed repetition to a lesson's progress record.
///
/// Increments the sentence's count, then checks stage completion: when every
/// sentence in the lesson has met the current stage's requirement, the stage
/// advances, `last_completion` is stamped with `now`, and all counts reset
/// to 0 against the next stage's requirement.
///
/// Pure with respect to its inputs; the caller owns persistence and event
/// emission.
///
/// # Errors
///
/// - `TerminalStage` if the lesson is already mastered
/// - `UnknownSentence` if the sentence is not in the lesson
/// - `RepetitionOverflow` if the sentence already met the requirement
pub fn apply_repetition(
    progress: &LessonProgress,
    lesson: &Lesson,
    sentence_id: &SentenceId,
    stages: &StageTable,
    now: DateTime<Utc>,
) -> Result<RepetitionOutcome, RepetitionError> {
    if stages.is_terminal(progress.stage) {
        return Err(RepetitionError::TerminalStage);
    }
    if !lesson.contains(sentence_id) {
        return Err(RepetitionError::UnknownSentence(sentence_id.clone()));
    }

    let required = stages.stage_at(progress.stage).reps_required;
    let done = progress.reps_for(sentence_id);
    if done >= required {
        return Err(RepetitionError::RepetitionOverflow {
            id: sentence_id.clone(),
            required,
        });
    }

    let mut updated = progress.clone();
    *updated.sentence_reps.entry(sentence_id.clone()).or_insert(0) += 1;

    let stage_complete = lesson
        .sentence_ids()
        .all(|id| updated.reps_for(id) >= required);

    let advance = if stage_complete {
        let from = updated.stage;
        updated.stage += 1;
        updated.last_completion = Some(now);
        for reps in updated.sentence_reps.values_mut() {
            *reps = 0;
        }
        Some(StageAdvance {
            from,
            to: updated.stage,
            first_completion: from == 0,
        })
    } else {
        None
    };

    Ok(RepetitionOutcome {
        progress: updated,
        advance,
    })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
