//! Lesson content: static lesson files, the built-in phrasebook, and the
//! expander that turns a sparse lesson into a full practice session.
//!
//! # Lesson Locations
//!
//! - Lesson files: `data/lessons/{language}/lesson-NN.json`
//!
//! Loading never fails from the learner's point of view: a missing or
//! malformed file produces a session built entirely from phrasebook filler.

pub mod expander;
pub mod lessons;
pub mod phrasebook;

pub use expander::expand_items;
pub use lessons::{
    LessonError, LessonFile, LessonSummary, is_valid_language_code, lesson_id, list_lessons,
    load_items_or_fallback, load_lesson, parse_lesson_id,
};

use std::path::Path;

use crate::domain::QuizItem;

/// Load a lesson by id and expand it to a full session.
pub fn session_items(lessons_dir: &Path, lesson_id: &str) -> Result<Vec<QuizItem>, LessonError> {
    let (language, lesson) = parse_lesson_id(lesson_id)?;
    let source = load_items_or_fallback(lessons_dir, &language, lesson);
    Ok(expand_items(&source, &language, lesson))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SESSION_SIZE;
    use tempfile::TempDir;

    #[test]
    fn test_session_items_for_missing_lesson() {
        let temp = TempDir::new().unwrap();
        let items = session_items(temp.path(), "ja-1").unwrap();
        assert_eq!(items.len(), SESSION_SIZE);
    }

    #[test]
    fn test_session_items_rejects_bad_id() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            session_items(temp.path(), "lesson"),
            Err(LessonError::InvalidId(_))
        ));
    }
}
