//! Shared error types for the services crate.

use thiserror::Error;

use drill_core::model::LessonKey;
use drill_core::mutator::RepetitionError;
use storage::gateway::PersistenceError;

/// Errors emitted by `ContentProvider` implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("content backend error: {0}")]
    Backend(String),
}

/// Errors emitted by `PracticeService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PracticeError {
    /// No progress record was initialized for the lesson — a caller bug,
    /// not a user-facing failure.
    #[error("no progress record for lesson {0}; call ensure_initialized first")]
    NotFound(LessonKey),
    #[error("lesson {0} is unknown to the content provider")]
    UnknownLesson(LessonKey),
    #[error(transparent)]
    Repetition(#[from] RepetitionError),
    #[error(transparent)]
    Content(#[from] ContentError),
    /// The remote save failed; the in-memory record is already updated and
    /// the caller may retry the sync.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Errors emitted by `SessionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("lesson {0} is unknown to the content provider")]
    UnknownLesson(LessonKey),
    #[error(transparent)]
    Content(#[from] ContentError),
}

/// Errors emitted by `StatsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatsError {
    #[error("lesson {0} is unknown to the content provider")]
    UnknownLesson(LessonKey),
    #[error(transparent)]
    Content(#[from] ContentError),
}
