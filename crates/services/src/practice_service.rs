use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::warn;

use drill_core::Clock;
use drill_core::model::{LessonKey, LessonProgress, SentenceId};
use drill_core::mutator::{self, RepetitionError, StageAdvance};
use drill_core::stages::StageTable;
use drill_core::status::{self, LessonStatus};
use storage::{ModifyError, ProgressStore};

use crate::content::ContentProvider;
use crate::error::PracticeError;
use crate::events::{FIRST_COMPLETION_BONUS, PointsLedger, REPETITION_POINTS, StreakTracker};

//
// ─── RESULT ────────────────────────────────────────────────────────────────────
//

/// Outcome of an accepted repetition: the committed record and the stage
/// transition, if this repetition completed the stage.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRepetition {
    pub progress: LessonProgress,
    pub advance: Option<StageAdvance>,
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Coordinates applying a learner's completed repetitions to the progress
/// store, emitting point/streak events to collaborators along the way.
pub struct PracticeService {
    clock: Clock,
    stages: StageTable,
    store: Arc<ProgressStore>,
    content: Arc<dyn ContentProvider>,
    points: Arc<dyn PointsLedger>,
    streak: Arc<dyn StreakTracker>,
}

impl PracticeService {
    /// Create a practice service over the production stage table and the
    /// system clock.
    #[must_use]
    pub fn new(
        store: Arc<ProgressStore>,
        content: Arc<dyn ContentProvider>,
        points: Arc<dyn PointsLedger>,
        streak: Arc<dyn StreakTracker>,
    ) -> Self {
        Self {
            clock: Clock::default(),
            stages: StageTable::default(),
            store,
            content,
            points,
            streak,
        }
    }

    /// Override the clock (usually for deterministic testing).
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Override the stage table.
    #[must_use]
    pub fn with_stages(mut self, stages: StageTable) -> Self {
        self.stages = stages;
        self
    }

    /// Current time according to the service's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    #[must_use]
    pub fn stages(&self) -> &StageTable {
        &self.stages
    }

    /// Time-gated availability of a lesson right now. Lessons with no
    /// record resolve as `Learning`.
    #[must_use]
    pub fn resolve(&self, key: &LessonKey) -> LessonStatus {
        status::resolve_status(self.store.get(key).as_ref(), &self.stages, self.clock.now())
    }

    /// Apply one completed repetition to a lesson.
    ///
    /// Increments the sentence's count, advances the stage when every
    /// sentence met the requirement, awards the per-repetition point and —
    /// on an advance out of stage 0 — the first-completion bonus, signals
    /// the streak tracker on every advance, and commits the record through
    /// the store.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the lesson was never initialized in the store
    /// - `UnknownLesson` if the content provider does not know the lesson
    /// - `Repetition` for terminal/overflow/unknown-sentence violations
    /// - `Persistence` if the remote save fails; the in-memory record is
    ///   already committed and the caller may retry the sync
    pub async fn record_repetition(
        &self,
        key: &LessonKey,
        sentence: &SentenceId,
    ) -> Result<RecordedRepetition, PracticeError> {
        let lesson = self
            .content
            .get_lesson(key)
            .await?
            .ok_or_else(|| PracticeError::UnknownLesson(key.clone()))?;

        let now = self.clock.now();
        // The whole read-modify-write runs under the store lock so a
        // near-simultaneous submission for the same lesson cannot lose
        // this increment or see a half-applied stage check.
        let modified = self.store.modify(key, |progress| {
            mutator::apply_repetition(progress, &lesson, sentence, &self.stages, now)
                .map(|outcome| (outcome.progress, outcome.advance))
        });
        let (progress, advance) = match modified {
            Ok(committed) => committed,
            Err(ModifyError::MissingRecord) => {
                return Err(PracticeError::NotFound(key.clone()));
            }
            Err(ModifyError::Rejected(err)) => {
                if err == RepetitionError::TerminalStage {
                    // The UI should never offer a mastered lesson; log and
                    // refuse without touching the record.
                    warn!(lesson = %key, "repetition submitted against a mastered lesson");
                }
                return Err(err.into());
            }
        };

        self.points.award(REPETITION_POINTS);
        if let Some(advance) = advance {
            if advance.first_completion {
                self.points.award(FIRST_COMPLETION_BONUS);
            }
            self.streak.check_and_update(now);
        }

        if let Err(err) = self.store.persist(key, &progress).await {
            warn!(lesson = %key, error = %err, "progress sync failed, keeping local state");
            return Err(err.into());
        }

        Ok(RecordedRepetition { progress, advance })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
