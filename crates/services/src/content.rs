use async_trait::async_trait;
use std::sync::Arc;

use drill_core::model::{Lesson, LessonKey, LessonLibrary, LevelKey};

use crate::error::ContentError;

/// Boundary contract for lesson content.
///
/// The engine consumes lessons as opaque ordered sentence lists; how they
/// are fetched (bundled, cached, network index) is the implementation's
/// business. This replaces the original's dynamic module loading with an
/// explicit capability.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Fetch one lesson. `None` means the key is unknown to this provider.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if the backing source cannot be read.
    async fn get_lesson(&self, key: &LessonKey) -> Result<Option<Lesson>, ContentError>;

    /// Keys of the lessons in a level, in presentation order.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if the backing source cannot be read.
    async fn list_level_lessons(&self, level: &LevelKey)
    -> Result<Vec<LessonKey>, ContentError>;
}

/// Content provider over a fully loaded in-memory library, for tests and
/// bundled content.
#[derive(Clone, Default)]
pub struct InMemoryContent {
    library: Arc<LessonLibrary>,
}

impl InMemoryContent {
    #[must_use]
    pub fn new(library: LessonLibrary) -> Self {
        Self {
            library: Arc::new(library),
        }
    }
}

#[async_trait]
impl ContentProvider for InMemoryContent {
    async fn get_lesson(&self, key: &LessonKey) -> Result<Option<Lesson>, ContentError> {
        Ok(self
            .library
            .values()
            .find_map(|level| level.get(key))
            .cloned())
    }

    async fn list_level_lessons(
        &self,
        level: &LevelKey,
    ) -> Result<Vec<LessonKey>, ContentError> {
        Ok(self
            .library
            .get(level)
            .map(|lessons| lessons.keys().cloned().collect())
            .unwrap_or_default())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
