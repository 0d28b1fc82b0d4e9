//! Static lesson files: `{lessons_dir}/{language}/lesson-NN.json`.

use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

use crate::domain::QuizItem;
use crate::paths;

/// Parsed lesson file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonFile {
    #[serde(default)]
    pub title: Option<String>,
    /// Malformed entries are skipped, the rest are kept
    #[serde(default, deserialize_with = "lenient_items")]
    pub items: Vec<QuizItem>,
    #[serde(default)]
    pub difficulty: Option<String>,
    /// Minutes
    #[serde(default)]
    pub estimated_time: Option<u32>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

/// Lesson listing entry (metadata only)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonSummary {
    pub lesson_id: String,
    pub lesson: u32,
    pub title: Option<String>,
    pub item_count: usize,
    pub difficulty: Option<String>,
    pub estimated_time: Option<u32>,
    pub prerequisites: Vec<String>,
}

/// Lesson loading errors.
#[derive(Debug)]
pub enum LessonError {
    InvalidId(String),
    NotFound(String),
    IoError(String, String),
    ParseError(String, String),
}

impl std::fmt::Display for LessonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LessonError::InvalidId(id) => write!(f, "Invalid lesson id: {}", id),
            LessonError::NotFound(path) => write!(f, "Lesson file not found: {}", path),
            LessonError::IoError(path, err) => write!(f, "IO error reading {}: {}", path, err),
            LessonError::ParseError(path, err) => write!(f, "Parse error in {}: {}", path, err),
        }
    }
}

impl std::error::Error for LessonError {}

/// Build a lesson id like `ja-1`
pub fn lesson_id(language: &str, lesson: u32) -> String {
    format!("{}-{}", language, lesson)
}

/// Language codes double as directory names: letters, digits, `-` and `_` only
pub fn is_valid_language_code(code: &str) -> bool {
    !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Split a lesson id into language code and lesson number.
///
/// The number is taken after the last `-`, so `zh-TW-3` is `("zh-TW", 3)`.
pub fn parse_lesson_id(id: &str) -> Result<(String, u32), LessonError> {
    let (language, number) = id
        .trim()
        .rsplit_once('-')
        .ok_or_else(|| LessonError::InvalidId(id.to_string()))?;

    if !is_valid_language_code(language) {
        return Err(LessonError::InvalidId(id.to_string()));
    }

    let lesson: u32 = number
        .parse()
        .map_err(|_| LessonError::InvalidId(id.to_string()))?;
    if lesson == 0 {
        return Err(LessonError::InvalidId(id.to_string()));
    }

    Ok((language.to_string(), lesson))
}

/// Load and parse one lesson file.
pub fn load_lesson(lessons_dir: &Path, language: &str, lesson: u32) -> Result<LessonFile, LessonError> {
    let path = paths::lesson_path(lessons_dir, language, lesson);
    if !path.exists() {
        return Err(LessonError::NotFound(path.display().to_string()));
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| LessonError::IoError(path.display().to_string(), e.to_string()))?;

    serde_json::from_str(&content)
        .map_err(|e| LessonError::ParseError(path.display().to_string(), e.to_string()))
}

/// Source items for a lesson, or an empty list when the file is missing or
/// broken. The expander fills the gap with phrasebook content.
pub fn load_items_or_fallback(lessons_dir: &Path, language: &str, lesson: u32) -> Vec<QuizItem> {
    match load_lesson(lessons_dir, language, lesson) {
        Ok(file) => file.items,
        Err(e) => {
            tracing::warn!("Falling back to generated content for {}-{}: {}", language, lesson, e);
            Vec::new()
        }
    }
}

fn lenient_items<'de, D>(deserializer: D) -> Result<Vec<QuizItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<QuizItem>(value) {
            Ok(item) if item.question.trim().is_empty() || item.answer.trim().is_empty() => {
                tracing::warn!("Skipping lesson item #{}: blank question or answer", index + 1);
                None
            }
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!("Skipping lesson item #{}: {}", index + 1, e);
                None
            }
        })
        .collect())
}

/// Parse a lesson number out of `lesson-NN.json`
fn lesson_number_from_file_name(name: &str) -> Option<u32> {
    name.strip_prefix("lesson-")?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

/// List the lessons available for a language, sorted by number.
///
/// Unreadable files are skipped with a warning.
pub fn list_lessons(lessons_dir: &Path, language: &str) -> Vec<LessonSummary> {
    let dir = paths::language_dir(lessons_dir, language);
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut lessons: Vec<LessonSummary> = entries
        .filter_map(|e| e.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            lesson_number_from_file_name(&name)
        })
        .filter_map(|number| match load_lesson(lessons_dir, language, number) {
            Ok(file) => Some(LessonSummary {
                lesson_id: lesson_id(language, number),
                lesson: number,
                title: file.title,
                item_count: file.items.len(),
                difficulty: file.difficulty,
                estimated_time: file.estimated_time,
                prerequisites: file.prerequisites,
            }),
            Err(e) => {
                tracing::warn!("Skipping lesson {}: {}", lesson_id(language, number), e);
                None
            }
        })
        .collect();

    lessons.sort_by_key(|l| l.lesson);
    lessons
}
