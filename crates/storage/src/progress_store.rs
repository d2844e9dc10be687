use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use drill_core::model::{Lesson, LessonKey, LessonProgress, UserId};

use crate::gateway::{PersistenceError, PersistenceGateway};

/// Outcome of a rejected or unroutable [`ProgressStore::modify`] call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModifyError<E> {
    /// The lesson has no record; `ensure_initialized` was never called.
    #[error("no progress record for the lesson")]
    MissingRecord,
    /// The closure refused the mutation; the stored record is untouched.
    #[error(transparent)]
    Rejected(E),
}

/// Owner of the in-memory `lesson → progress` map: the single source of
/// truth the rest of the engine reads.
///
/// All mutation runs under one mutex, and [`ProgressStore::modify`] runs
/// the whole read-modify-write under it, so near-simultaneous repetition
/// submissions for the same lesson cannot interleave. Reads hand out
/// clones of the latest committed record. The gateway is never awaited
/// while the lock is held.
pub struct ProgressStore {
    user: UserId,
    records: Mutex<HashMap<LessonKey, LessonProgress>>,
    gateway: Arc<dyn PersistenceGateway>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(user: UserId, gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self {
            user,
            records: Mutex::new(HashMap::new()),
            gateway,
        }
    }

    #[must_use]
    pub fn user(&self) -> &UserId {
        &self.user
    }

    // A poisoned lock only means a panic elsewhere mid-update never
    // happened between map operations (each is a single insert/read), so
    // the map is still consistent and the guard is safe to recover.
    fn lock(&self) -> MutexGuard<'_, HashMap<LessonKey, LessonProgress>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the map with the user's remotely persisted records.
    /// Called once at session start.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the gateway cannot be read; the
    /// current map is left untouched.
    pub async fn hydrate(&self) -> Result<usize, PersistenceError> {
        let loaded = self.gateway.load_all_progress(&self.user).await?;
        let count = loaded.len();
        *self.lock() = loaded;
        Ok(count)
    }

    /// Latest committed record for a lesson, if one exists.
    #[must_use]
    pub fn get(&self, key: &LessonKey) -> Option<LessonProgress> {
        self.lock().get(key).cloned()
    }

    /// Create the fresh stage-0 record for a lesson on first encounter.
    /// Idempotent: an existing record is never reset. Returns whether a
    /// record was created.
    pub fn ensure_initialized(&self, key: &LessonKey, lesson: &Lesson) -> bool {
        let mut guard = self.lock();
        if guard.contains_key(key) {
            return false;
        }
        guard.insert(key.clone(), LessonProgress::new_for(lesson));
        true
    }

    /// Initialize every lesson of a level in one pass. Returns the number
    /// of records created.
    pub fn ensure_level_initialized<'a>(
        &self,
        lessons: impl IntoIterator<Item = (&'a LessonKey, &'a Lesson)>,
    ) -> usize {
        lessons
            .into_iter()
            .filter(|(key, lesson)| self.ensure_initialized(key, lesson))
            .count()
    }

    /// Run a read-modify-write for one lesson atomically: the closure sees
    /// the committed record and its replacement is inserted before the lock
    /// drops, so concurrent submissions for the same key cannot lose
    /// updates. The closure also returns a value of the caller's choosing
    /// (a transition report, typically), handed back alongside the
    /// committed record.
    ///
    /// The gateway is not involved; forward the committed record with
    /// [`ProgressStore::persist`] after the lock is released.
    ///
    /// # Errors
    ///
    /// - `MissingRecord` if the lesson was never initialized
    /// - `Rejected` wrapping the closure's error; the map is untouched
    pub fn modify<T, E>(
        &self,
        key: &LessonKey,
        mutate: impl FnOnce(&LessonProgress) -> Result<(LessonProgress, T), E>,
    ) -> Result<(LessonProgress, T), ModifyError<E>> {
        let mut guard = self.lock();
        let current = guard.get(key).ok_or(ModifyError::MissingRecord)?;
        let (next, report) = mutate(current).map_err(ModifyError::Rejected)?;
        guard.insert(key.clone(), next.clone());
        Ok((next, report))
    }

    /// Forward an already-committed record to the persistence collaborator.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the remote save fails; the in-memory
    /// record stays committed either way.
    pub async fn persist(
        &self,
        key: &LessonKey,
        progress: &LessonProgress,
    ) -> Result<(), PersistenceError> {
        self.gateway.save_progress(&self.user, key, progress).await
    }

    /// Replace the stored record and forward it to the persistence
    /// collaborator. The in-memory commit happens first and survives a
    /// gateway failure (optimistic local mutation; the caller may retry
    /// the remote sync).
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the remote save fails.
    pub async fn upsert(
        &self,
        key: &LessonKey,
        progress: LessonProgress,
    ) -> Result<(), PersistenceError> {
        self.lock().insert(key.clone(), progress.clone());
        self.persist(key, &progress).await
    }

    /// Committed view of every record, for aggregation and session
    /// building.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<LessonKey, LessonProgress> {
        self.lock().clone()
    }

    /// Number of lessons with a progress record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
