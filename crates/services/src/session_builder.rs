use rand::Rng;
use rand::rng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;
use std::sync::Arc;

use drill_core::Clock;
use drill_core::model::{Lesson, LessonKey, LessonProgress, Sentence};
use drill_core::stages::StageTable;
use drill_core::status::{LessonStatus, resolve_status};
use storage::ProgressStore;

use crate::content::ContentProvider;
use crate::error::SessionError;

//
// ─── PRACTICE ITEMS ────────────────────────────────────────────────────────────
//

/// A single drill instance. A sentence needing K more repetitions
/// contributes K separate items to the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeItem {
    pub sentence: Sentence,
    pub lesson_key: LessonKey,
}

/// One lesson's row in the review overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewEntry {
    pub lesson_key: LessonKey,
    pub status: LessonStatus,
}

/// Everything the review center renders: lessons past the learning stage
/// grouped by stage (ascending), plus the keys currently due for review.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewOverview {
    pub sections: BTreeMap<usize, Vec<ReviewEntry>>,
    pub active: Vec<LessonKey>,
}

/// Expand a lesson's outstanding repetitions into drill items, in lesson
/// order (the shuffle happens once per session).
fn expand_outstanding(
    key: &LessonKey,
    lesson: &Lesson,
    progress: &LessonProgress,
    required: u32,
) -> Vec<PracticeItem> {
    let mut items = Vec::new();
    for sentence in &lesson.sentences {
        for _ in progress.reps_for(&sentence.id)..required {
            items.push(PracticeItem {
                sentence: sentence.clone(),
                lesson_key: key.clone(),
            });
        }
    }
    items
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Assembles shuffled practice queues from the progress store and the
/// content provider.
pub struct SessionService {
    clock: Clock,
    stages: StageTable,
    store: Arc<ProgressStore>,
    content: Arc<dyn ContentProvider>,
}

impl SessionService {
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

    /// Number of repetitions still outstanding for the lesson's current
    /// stage. Zero means the stage is complete (or the lesson mastered).
    ///
    /// # Errors
    ///
    /// Returns `UnknownLesson` if the content provider does not know the
    /// key.
    pub async fn outstanding_repetitions(&self, key: &LessonKey) -> Result<u32, SessionError> {
        let (lesson, progress) = self.lesson_and_progress(key).await?;
        let required = self.stages.stage_at(progress.stage).reps_required;
        Ok(lesson
            .sentence_ids()
            .map(|id| required.saturating_sub(progress.reps_for(id)))
            .sum())
    }

    /// Single-lesson practice queue: the lesson's outstanding repetitions,
    /// shuffled. An empty queue is a valid result.
    ///
    /// # Errors
    ///
    /// Returns `UnknownLesson` if the content provider does not know the
    /// key.
    pub async fn lesson_session(&self, key: &LessonKey) -> Result<Vec<PracticeItem>, SessionError> {
        let mut items = self.lesson_items(key).await?;
        items.shuffle(&mut rng());
        Ok(items)
    }

    /// Single-lesson queue with a caller-supplied random source, for
    /// deterministic tests.
    ///
    /// # Errors
    ///
    /// Returns `UnknownLesson` if the content provider does not know the
    /// key.
    pub async fn lesson_session_with_rng<R: Rng + ?Sized>(
        &self,
        key: &LessonKey,
        rng: &mut R,
    ) -> Result<Vec<PracticeItem>, SessionError> {
        let mut items = self.lesson_items(key).await?;
        items.shuffle(rng);
        Ok(items)
    }

    /// Global review queue: every lesson currently due for review,
    /// expanded and shuffled into one sitting.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` failures from the provider.
    pub async fn global_review_session(&self) -> Result<Vec<PracticeItem>, SessionError> {
        let mut items = self.review_items().await?;
        items.shuffle(&mut rng());
        Ok(items)
    }

    /// Global review queue with a caller-supplied random source.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` failures from the provider.
    pub async fn global_review_session_with_rng<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Vec<PracticeItem>, SessionError> {
        let mut items = self.review_items().await?;
        items.shuffle(rng);
        Ok(items)
    }

    /// Snapshot of every lesson past the learning stage, grouped by stage,
    /// with the currently-due keys listed separately.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` failures from the provider.
    pub async fn review_overview(&self) -> Result<ReviewOverview, SessionError> {
        let now = self.clock.now();
        let snapshot = self.store.snapshot();
        let mut keys: Vec<_> = snapshot.keys().cloned().collect();
        keys.sort();

        let mut overview = ReviewOverview::default();
        for key in keys {
            if self.content.get_lesson(&key).await?.is_none() {
                continue;
            }
            let status = resolve_status(Some(&snapshot[&key]), &self.stages, now);
            if matches!(status, LessonStatus::Learning { .. }) {
                continue;
            }
            if matches!(status, LessonStatus::Active { .. }) {
                overview.active.push(key.clone());
            }
            overview
                .sections
                .entry(status.stage())
                .or_default()
                .push(ReviewEntry {
                    lesson_key: key,
                    status,
                });
        }
        Ok(overview)
    }

    async fn lesson_items(&self, key: &LessonKey) -> Result<Vec<PracticeItem>, SessionError> {
        let (lesson, progress) = self.lesson_and_progress(key).await?;
        let required = self.stages.stage_at(progress.stage).reps_required;
        Ok(expand_outstanding(key, &lesson, &progress, required))
    }

    /// Unshuffled concatenation of every due lesson's outstanding items,
    /// in key order.
    async fn review_items(&self) -> Result<Vec<PracticeItem>, SessionError> {
        let now = self.clock.now();
        let snapshot = self.store.snapshot();
        let mut keys: Vec<_> = snapshot.keys().cloned().collect();
        keys.sort();

        let mut items = Vec::new();
        for key in keys {
            let progress = &snapshot[&key];
            let status = resolve_status(Some(progress), &self.stages, now);
            if !matches!(status, LessonStatus::Active { .. }) {
                continue;
            }
            // A record may outlive its lesson in the content index.
            let Some(lesson) = self.content.get_lesson(&key).await? else {
                continue;
            };
            let required = self.stages.stage_at(progress.stage).reps_required;
            items.extend(expand_outstanding(&key, &lesson, progress, required));
        }
        Ok(items)
    }

    async fn lesson_and_progress(
        &self,
        key: &LessonKey,
    ) -> Result<(Lesson, LessonProgress), SessionError> {
        let lesson = self
            .content
            .get_lesson(key)
            .await?
            .ok_or_else(|| SessionError::UnknownLesson(key.clone()))?;
        // A lesson never seen before drills like a fresh record.
        let progress = self
            .store
            .get(key)
            .unwrap_or_else(|| LessonProgress::new_for(&lesson));
        Ok((lesson, progress))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
