//! Project path functions - single source of truth for all file paths.
//!
//! ## Environment Variables
//!
//! - `DATA_DIR`: Override the base data directory (default: "data")
//! - `PORT`: Override the server port (see config.rs)
//!
//! This allows running multiple isolated server instances side by side:
//! ```bash
//! DATA_DIR=data/test/a PORT=3001 cargo run
//! ```

use std::env;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Lazily initialized data directory from DATA_DIR env var
static DATA_DIR_VALUE: OnceLock<String> = OnceLock::new();

/// Get the base data directory (from DATA_DIR env var or default "data")
pub fn data_dir() -> &'static str {
    DATA_DIR_VALUE.get_or_init(|| env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// SQLite database path
pub fn db_path() -> String {
    format!("{}/lingoquest.db", data_dir())
}

/// Root of the static lesson JSON tree
pub fn lessons_dir() -> String {
    format!("{}/lessons", data_dir())
}

/// Directory holding one language's lesson files
pub fn language_dir(lessons_root: &Path, language: &str) -> PathBuf {
    lessons_root.join(language)
}

/// File name for a lesson number, zero-padded to two digits
pub fn lesson_file_name(lesson: u32) -> String {
    format!("lesson-{:02}.json", lesson)
}

/// Full path of a lesson file
pub fn lesson_path(lessons_root: &Path, language: &str, lesson: u32) -> PathBuf {
    language_dir(lessons_root, language).join(lesson_file_name(lesson))
}

// ==================== Tests ====================
