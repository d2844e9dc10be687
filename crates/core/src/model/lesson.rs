use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::keys::{LessonKey, LevelKey, SentenceId};

//
// ─── SENTENCE ──────────────────────────────────────────────────────────────────
//

/// One drillable sentence with its display fields.
///
/// The engine only ever consults `id`; everything else is carried opaquely
/// for the presentation layer (translation, highlight span, pronunciation
/// guides, learner tips).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub id: SentenceId,
    pub en: String,
    pub ar: String,
    pub highlight: String,
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation_ar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip_ar: Option<String>,
}

impl Sentence {
    /// Builds a sentence with the mandatory display fields; the optional
    /// pronunciation/tip fields start empty.
    #[must_use]
    pub fn new(id: SentenceId, en: impl Into<String>, ar: impl Into<String>) -> Self {
        Self {
            id,
            en: en.into(),
            ar: ar.into(),
            highlight: String::new(),
            context: String::new(),
            pronunciation_en: None,
            pronunciation_ar: None,
            tip_ar: None,
        }
    }
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// A titled, ordered set of sentences, supplied read-only by the content
/// provider. Sentence order is the presentation order; sessions shuffle
/// their own copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub title: String,
    pub sentences: Vec<Sentence>,
}

impl Lesson {
    #[must_use]
    pub fn new(title: impl Into<String>, sentences: Vec<Sentence>) -> Self {
        Self {
            title: title.into(),
            sentences,
        }
    }

    /// Number of sentences in the lesson.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Whether the lesson contains a sentence with the given id.
    #[must_use]
    pub fn contains(&self, id: &SentenceId) -> bool {
        self.sentences.iter().any(|s| &s.id == id)
    }

    pub fn sentence_ids(&self) -> impl Iterator<Item = &SentenceId> {
        self.sentences.iter().map(|s| &s.id)
    }
}

/// Lessons of one level, keyed by lesson. Ordered for deterministic listings.
pub type Level = BTreeMap<LessonKey, Lesson>;

/// The full content library: levels of lessons.
pub type LessonLibrary = BTreeMap<LevelKey, Level>;

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

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
    fn lesson_reports_length_and_membership() {
        let lesson = build_lesson();
        assert_eq!(lesson.len(), 2);
        assert!(!lesson.is_empty());
        assert!(lesson.contains(&SentenceId::new("s1")));
        assert!(!lesson.contains(&SentenceId::new("s9")));
    }

    #[test]
    fn sentence_ids_follow_lesson_order() {
        let lesson = build_lesson();
        let ids: Vec<&str> = lesson.sentence_ids().map(SentenceId::as_str).collect();
        assert_eq!(ids, vec!["s1", "s2"]);
    }

    #[test]
    fn sentence_serializes_without_empty_optionals() {
        let sentence = Sentence::new(SentenceId::new("s1"), "Hello.", "مرحبا");
        let json = serde_json::to_string(&sentence).unwrap();
        assert!(!json.contains("pronunciation_en"));
        assert!(!json.contains("tip_ar"));
    }
}
