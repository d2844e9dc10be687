use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::keys::SentenceId;
use crate::model::lesson::Lesson;

/// Per-lesson SRS progress record: the only state the engine owns.
///
/// Invariants (upheld by `mutator::apply_repetition`, the sole mutation
/// path):
///
/// * `stage` never exceeds the stage table's last index.
/// * Every count in `sentence_reps` stays at or below the current stage's
///   required repetitions; all counts reset to 0 the moment `stage`
///   advances.
/// * `last_completion` is absent only while the lesson has never left
///   stage 0; every stage advance stamps it.
/// * The last stage is terminal: the record stops changing.
///
/// Records are created once per lesson and never deleted; they are the
/// learner's permanent history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonProgress {
    pub stage: usize,
    pub last_completion: Option<DateTime<Utc>>,
    pub sentence_reps: HashMap<SentenceId, u32>,
}

impl LessonProgress {
    /// Fresh record for a lesson that has just been encountered:
    /// stage 0, no completion yet, every sentence at 0 repetitions.
    #[must_use]
    pub fn new_for(lesson: &Lesson) -> Self {
        Self {
            stage: 0,
            last_completion: None,
            sentence_reps: lesson
                .sentence_ids()
                .map(|id| (id.clone(), 0))
                .collect(),
        }
    }

    /// Repetitions completed for one sentence in the current stage.
    /// Unknown ids read as 0.
    #[must_use]
    pub fn reps_for(&self, id: &SentenceId) -> u32 {
        self.sentence_reps.get(id).copied().unwrap_or(0)
    }

    /// Sum of repetitions completed across all sentences in the current
    /// stage.
    #[must_use]
    pub fn total_reps_done(&self) -> u64 {
        self.sentence_reps.values().map(|&r| u64::from(r)).sum()
    }

    /// Whether the lesson has completed its initial learning stage.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.stage > 0
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::lesson::Sentence;

    fn build_lesson() -> Lesson {
        Lesson::new(
            "Greetings",
            vec![
                Sentence::new(SentenceId::new("s1"), "Good morning.", "صباح الخير"),
                Sentence::new(SentenceId::new("s2"), "How are you?", "كيف حالك؟"),
            ],
        )
    }

    #[test]
    fn new_record_starts_at_stage_zero_with_zeroed_reps() {
        let progress = LessonProgress::new_for(&build_lesson());
        assert_eq!(progress.stage, 0);
        assert!(progress.last_completion.is_none());
        assert_eq!(progress.sentence_reps.len(), 2);
        assert!(progress.sentence_reps.values().all(|&r| r == 0));
        assert!(!progress.is_started());
    }

    #[test]
    fn reps_for_unknown_sentence_reads_zero() {
        let progress = LessonProgress::new_for(&build_lesson());
        assert_eq!(progress.reps_for(&SentenceId::new("missing")), 0);
    }

    #[test]
    fn total_reps_done_sums_all_sentences() {
        let mut progress = LessonProgress::new_for(&build_lesson());
        progress.sentence_reps.insert(SentenceId::new("s1"), 3);
        progress.sentence_reps.insert(SentenceId::new("s2"), 2);
        assert_eq!(progress.total_reps_done(), 5);
    }

    #[test]
    fn progress_round_trips_through_serde() {
        let mut progress = LessonProgress::new_for(&build_lesson());
        progress.stage = 2;
        progress.last_completion = Some(crate::time::fixed_now());
        progress.sentence_reps.insert(SentenceId::new("s1"), 1);

        let json = serde_json::to_string(&progress).unwrap();
        let back: LessonProgress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, progress);
    }
}
