use axum::{
  extract::{Path, State},
  Json,
};
use serde::Serialize;

use crate::content::{self, LessonSummary};
use crate::db::{self, try_lock};
use crate::domain::{Language, QuizItem};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/languages
pub async fn list_languages(State(state): State<AppState>) -> AppResult<Json<Vec<Language>>> {
  let conn = try_lock(&state.db)?;
  Ok(Json(db::list_languages(&conn)?))
}

/// GET /api/languages/{code}/lessons
pub async fn list_lessons(
  State(state): State<AppState>,
  Path(code): Path<String>,
) -> AppResult<Json<Vec<LessonSummary>>> {
  if !content::is_valid_language_code(&code) {
    return Err(AppError::BadRequest(format!("Invalid language code: {}", code)));
  }
  Ok(Json(content::list_lessons(&state.lessons_dir, &code)))
}

#[derive(Debug, Serialize)]
pub struct LessonItems {
  pub lesson_id: String,
  pub language: String,
  pub lesson: u32,
  pub items: Vec<QuizItem>,
}

/// GET /api/lessons/{lesson_id}/items
///
/// Always 100 items; a missing lesson file yields phrasebook filler.
pub async fn get_lesson_items(
  State(state): State<AppState>,
  Path(lesson_id): Path<String>,
) -> AppResult<Json<LessonItems>> {
  let (language, lesson) = content::parse_lesson_id(&lesson_id)?;
  let items = content::session_items(&state.lessons_dir, &lesson_id)?;
  Ok(Json(LessonItems {
    lesson_id: content::lesson_id(&language, lesson),
    language,
    lesson,
    items,
  }))
}
