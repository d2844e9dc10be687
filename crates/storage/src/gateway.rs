use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

use drill_core::model::{LessonKey, LessonProgress, UserId};

/// Errors surfaced by the remote persistence collaborator.
///
/// A failed save never invalidates the engine's in-memory state; callers
/// surface it as a non-blocking sync warning and may retry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PersistenceError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Boundary contract for remote persistence of progress records.
///
/// Implementations own delivery, retry, and backoff; the engine calls
/// through once per mutation and moves on.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Fetch every progress record for a user, keyed by lesson. Used to
    /// hydrate the store at session start.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the backing service cannot be read.
    async fn load_all_progress(
        &self,
        user: &UserId,
    ) -> Result<HashMap<LessonKey, LessonProgress>, PersistenceError>;

    /// Persist or replace one lesson's progress record.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the write does not reach the backing
    /// service.
    async fn save_progress(
        &self,
        user: &UserId,
        lesson: &LessonKey,
        progress: &LessonProgress,
    ) -> Result<(), PersistenceError>;
}

/// In-memory gateway for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryGateway {
    records: Arc<Mutex<HashMap<(UserId, LessonKey), LessonProgress>>>,
}

impl InMemoryGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held, across all users.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl PersistenceGateway for InMemoryGateway {
    async fn load_all_progress(
        &self,
        user: &UserId,
    ) -> Result<HashMap<LessonKey, LessonProgress>, PersistenceError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| PersistenceError::Connection(e.to_string()))?;
        Ok(guard
            .iter()
            .filter(|((owner, _), _)| owner == user)
            .map(|((_, key), progress)| (key.clone(), progress.clone()))
            .collect())
    }

    async fn save_progress(
        &self,
        user: &UserId,
        lesson: &LessonKey,
        progress: &LessonProgress,
    ) -> Result<(), PersistenceError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| PersistenceError::Connection(e.to_string()))?;
        guard.insert((user.clone(), lesson.clone()), progress.clone());
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
