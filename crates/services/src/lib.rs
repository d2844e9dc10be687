#![forbid(unsafe_code)]

pub mod content;
pub mod error;
pub mod events;
pub mod practice_service;
pub mod session_builder;
pub mod stats;

pub use drill_core::Clock;

pub use content::{ContentProvider, InMemoryContent};
pub use error::{ContentError, PracticeError, SessionError, StatsError};
pub use events::{
    FIRST_COMPLETION_BONUS, PointsLedger, REPETITION_POINTS, RecordingLedger, RecordingStreak,
    StreakTracker,
};
pub use practice_service::{PracticeService, RecordedRepetition};
pub use session_builder::{PracticeItem, ReviewEntry, ReviewOverview, SessionService};
pub use stats::StatsService;
