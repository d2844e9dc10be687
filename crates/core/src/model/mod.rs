mod keys;
mod lesson;
mod progress;

pub use keys::{LessonKey, LevelKey, SentenceId, UserId};
pub use lesson::{Lesson, LessonLibrary, Level, Sentence};
pub use progress::LessonProgress;
