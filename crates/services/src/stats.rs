use std::sync::Arc;

use drill_core::Clock;
use drill_core::stages::StageTable;
use drill_core::status::{LessonStatus, resolve_status};
use drill_core::model::{LessonKey, LevelKey};
use storage::ProgressStore;

use crate::content::ContentProvider;
use crate::error::StatsError;

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Read-only aggregation over the progress store: completion counts and
/// the percentages the selection screens render.
pub struct StatsService {
    clock: Clock,
    stages: StageTable,
    store: Arc<ProgressStore>,
    content: Arc<dyn ContentProvider>,
}

impl StatsService {
    #[must_use]
    pub fn new(store: Arc<ProgressStore>, content: Arc<dyn ContentProvider>) -> Self {
        Self {
            clock: Clock::default(),
            stages: StageTable::default(),
            store,
            content,
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

    /// Lessons whose initial learning stage has been completed at least
    /// once.
    #[must_use]
    pub fn completed_lessons_count(&self) -> usize {
        self.store
            .snapshot()
            .values()
            .filter(|p| p.stage > 0)
            .count()
    }

    /// Lessons sitting at the terminal stage.
    #[must_use]
    pub fn mastered_lessons_count(&self) -> usize {
        self.store
            .snapshot()
            .values()
            .filter(|p| self.stages.is_terminal(p.stage))
            .count()
    }

    /// Completion percentage for one lesson, in `0.0..=100.0`.
    ///
    /// Mastered lessons and lessons resting between reviews read 100.
    /// Lessons still in the learning stage read the fraction of their
    /// initial repetitions done. A lesson whose review is currently due
    /// reads 0 until the review is cleared.
    ///
    /// # Errors
    ///
    /// Returns `UnknownLesson` if the content provider does not know the
    /// key.
    pub async fn lesson_completion_percent(&self, key: &LessonKey) -> Result<f64, StatsError> {
        let lesson = self
            .content
            .get_lesson(key)
            .await?
            .ok_or_else(|| StatsError::UnknownLesson(key.clone()))?;
        let Some(progress) = self.store.get(key) else {
            return Ok(0.0);
        };

        match resolve_status(Some(&progress), &self.stages, self.clock.now()) {
            LessonStatus::Mastered { .. } | LessonStatus::Locked { .. } => Ok(100.0),
            LessonStatus::Learning { .. } => {
                let required = self.stages.stage_at(0).reps_required;
                let target = u64::from(required) * lesson.len() as u64;
                if target == 0 {
                    return Ok(0.0);
                }
                Ok(100.0 * progress.total_reps_done() as f64 / target as f64)
            }
            LessonStatus::Active { .. } => Ok(0.0),
        }
    }

    /// Completion percentage for a whole level: half the weight for
    /// lessons started, half for lessons mastered. An empty or unknown
    /// level reads 0.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` failures from the provider.
    pub async fn level_completion_percent(&self, level: &LevelKey) -> Result<f64, StatsError> {
        let keys = self.content.list_level_lessons(level).await?;
        if keys.is_empty() {
            return Ok(0.0);
        }

        let mut started = 0usize;
        let mut mastered = 0usize;
        for key in &keys {
            let Some(progress) = self.store.get(key) else {
                continue;
            };
            if progress.is_started() {
                started += 1;
            }
            if self.stages.is_terminal(progress.stage) {
                mastered += 1;
            }
        }

        let total = keys.len() as f64;
        Ok(50.0 * started as f64 / total + 50.0 * mastered as f64 / total)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
