//! Lesson player endpoints.
//!
//! The player lives in the session store; every call performs one transition
//! and answers with the fresh snapshot. When a transition completes the
//! lesson for a known user, the result is written to the database in the
//! same response.

use axum::{
  extract::{Path, State},
  http::StatusCode,
  Json,
};
use serde::{Deserialize, Serialize};

use crate::content;
use crate::db::{self, try_lock, LessonRecord};
use crate::error::{AppError, AppResult};
use crate::player::{
  FlashcardRating, LessonResult, LessonSession, Presentation, QuizMode, SessionError, SessionView,
};
use crate::state::AppState;

use super::require_user;

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
  pub lesson_id: String,
  #[serde(default)]
  pub user_id: Option<i64>,
  #[serde(default)]
  pub mode: Option<QuizMode>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
  pub session_id: String,
  pub session: SessionView,
  pub presentation: Option<Presentation>,
  /// Present only on the response that completed the lesson
  #[serde(skip_serializing_if = "Option::is_none")]
  pub record: Option<LessonRecord>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
  pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
  pub rating: FlashcardRating,
}

#[derive(Debug, Deserialize)]
pub struct ModeRequest {
  pub mode: QuizMode,
}

/// POST /api/sessions
pub async fn start_session(
  State(state): State<AppState>,
  Json(request): Json<StartSessionRequest>,
) -> AppResult<(StatusCode, Json<SessionResponse>)> {
  let (language, lesson) = content::parse_lesson_id(&request.lesson_id)?;
  if let Some(user_id) = request.user_id {
    let conn = try_lock(&state.db)?;
    require_user(&conn, user_id)?;
  }

  let items = content::session_items(&state.lessons_dir, &request.lesson_id)?;
  let lesson_id = content::lesson_id(&language, lesson);
  let mut session = LessonSession::new(&lesson_id, &language, lesson, items);
  if let Some(user_id) = request.user_id {
    session = session.with_user(user_id);
  }
  if let Some(mode) = request.mode {
    session.set_mode(mode);
  }

  let view = session.view();
  let presentation = session.presentation();
  let session_id = state.sessions.insert(session);
  tracing::debug!("Started session {} for {}", session_id, lesson_id);

  Ok((
    StatusCode::CREATED,
    Json(SessionResponse {
      session_id,
      session: view,
      presentation,
      record: None,
    }),
  ))
}

/// GET /api/sessions/{sid}
pub async fn get_session(
  State(state): State<AppState>,
  Path(sid): Path<String>,
) -> AppResult<Json<SessionResponse>> {
  apply(&state, &sid, |_| Ok(()))
}

/// GET /api/sessions/{sid}/presentation
pub async fn get_presentation(
  State(state): State<AppState>,
  Path(sid): Path<String>,
) -> AppResult<Json<Presentation>> {
  let presentation = state
    .sessions
    .with_session(&sid, |s| s.presentation().ok_or(s.phase()))
    .ok_or_else(|| AppError::not_found("Session"))?;
  presentation
    .map(Json)
    .map_err(|phase| AppError::Conflict(format!("Nothing to present while {}", phase.as_str())))
}

/// DELETE /api/sessions/{sid}
pub async fn abandon_session(State(state): State<AppState>, Path(sid): Path<String>) -> AppResult<StatusCode> {
  state
    .sessions
    .remove(&sid)
    .map(|_| StatusCode::NO_CONTENT)
    .ok_or_else(|| AppError::not_found("Session"))
}

/// POST /api/sessions/{sid}/answer
pub async fn submit_answer(
  State(state): State<AppState>,
  Path(sid): Path<String>,
  Json(request): Json<AnswerRequest>,
) -> AppResult<Json<SessionResponse>> {
  apply(&state, &sid, |s| s.submit_answer(&request.answer).map(|_| ()))
}

/// POST /api/sessions/{sid}/rate
pub async fn rate_flashcard(
  State(state): State<AppState>,
  Path(sid): Path<String>,
  Json(request): Json<RateRequest>,
) -> AppResult<Json<SessionResponse>> {
  apply(&state, &sid, |s| s.rate_flashcard(request.rating).map(|_| ()))
}

/// POST /api/sessions/{sid}/skip
pub async fn skip(State(state): State<AppState>, Path(sid): Path<String>) -> AppResult<Json<SessionResponse>> {
  apply(&state, &sid, LessonSession::skip)
}

/// POST /api/sessions/{sid}/advance
pub async fn advance(State(state): State<AppState>, Path(sid): Path<String>) -> AppResult<Json<SessionResponse>> {
  apply(&state, &sid, |s| s.advance().map(|_| ()))
}

/// POST /api/sessions/{sid}/mode
pub async fn set_mode(
  State(state): State<AppState>,
  Path(sid): Path<String>,
  Json(request): Json<ModeRequest>,
) -> AppResult<Json<SessionResponse>> {
  apply(&state, &sid, |s| {
    s.set_mode(request.mode);
    Ok(())
  })
}

/// POST /api/sessions/{sid}/continue
pub async fn continue_batch(
  State(state): State<AppState>,
  Path(sid): Path<String>,
) -> AppResult<Json<SessionResponse>> {
  apply(&state, &sid, LessonSession::continue_batch)
}

/// POST /api/sessions/{sid}/restart-batch
pub async fn restart_batch(
  State(state): State<AppState>,
  Path(sid): Path<String>,
) -> AppResult<Json<SessionResponse>> {
  apply(&state, &sid, LessonSession::restart_batch)
}

/// POST /api/sessions/{sid}/review
pub async fn start_review(
  State(state): State<AppState>,
  Path(sid): Path<String>,
) -> AppResult<Json<SessionResponse>> {
  apply(&state, &sid, LessonSession::start_review)
}

/// POST /api/sessions/{sid}/refill
pub async fn refill_hearts(
  State(state): State<AppState>,
  Path(sid): Path<String>,
) -> AppResult<Json<SessionResponse>> {
  apply(&state, &sid, |s| {
    s.refill_hearts();
    Ok(())
  })
}

/// Run one transition, then persist the lesson result if it just completed.
/// The session lock is released before the database is touched. A result
/// that fails to store goes back to the session, so any later call on it
/// (a plain GET included) tries again.
fn apply<F>(state: &AppState, sid: &str, transition: F) -> AppResult<Json<SessionResponse>>
where
  F: FnOnce(&mut LessonSession) -> Result<(), SessionError>,
{
  let (view, presentation, finished) = state
    .sessions
    .with_session(sid, |s| {
      transition(s)?;
      let finished: Option<(i64, LessonResult)> =
        s.take_result().and_then(|result| s.user_id.map(|user_id| (user_id, result)));
      Ok::<_, SessionError>((s.view(), s.presentation(), finished))
    })
    .ok_or_else(|| AppError::not_found("Session"))??;

  let record = match finished {
    Some((user_id, result)) => match store_result(state, user_id, &result) {
      Ok(record) => Some(record),
      Err(e) => {
        tracing::warn!("Lesson result for session {} not stored, will retry: {}", sid, e);
        state.sessions.with_session(sid, LessonSession::return_result);
        return Err(e);
      }
    },
    None => None,
  };

  Ok(Json(SessionResponse {
    session_id: sid.to_string(),
    session: view,
    presentation,
    record,
  }))
}

fn store_result(state: &AppState, user_id: i64, result: &LessonResult) -> AppResult<LessonRecord> {
  let conn = try_lock(&state.db)?;
  Ok(db::record_lesson_result(&conn, user_id, result)?)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::NewUser;
  use crate::domain::{ItemType, QuizItem};
  use tempfile::TempDir;

  fn one_item_session(state: &AppState, user_id: i64) -> String {
    let items = vec![QuizItem::new("1", ItemType::Vocabulary, "hello", "hola")];
    let session = LessonSession::new("es-1", "es", 1, items).with_user(user_id);
    let sid = state.sessions.insert(session);
    state
      .sessions
      .with_session(&sid, |s| s.submit_answer("hola"))
      .unwrap()
      .unwrap();
    sid
  }

  #[test]
  fn test_failed_store_keeps_result_for_retry() {
    let temp = TempDir::new().unwrap();
    let state = AppState::new(db::init_memory_db().unwrap(), temp.path().to_path_buf());
    let user_id = {
      let conn = state.db.lock().unwrap();
      let new_user = NewUser {
        username: "retry".into(),
        display_name: None,
        native_language: None,
        learning_language: None,
      };
      db::create_user(&conn, &new_user).unwrap().id
    };
    let sid = one_item_session(&state, user_id);

    state
      .db
      .lock()
      .unwrap()
      .execute_batch("DROP TABLE lesson_progress")
      .unwrap();
    assert!(apply(&state, &sid, |s| s.advance().map(|_| ())).is_err());
    {
      let conn = state.db.lock().unwrap();
      assert_eq!(db::get_user(&conn, user_id).unwrap().unwrap().xp, 0);
      db::run_migrations(&conn).unwrap();
    }

    let retried = apply(&state, &sid, |_| Ok(())).unwrap().0;
    assert_eq!(retried.session.phase, crate::player::Phase::LessonComplete);
    let record = retried.record.expect("stored on retry");
    assert_eq!(record.xp_earned, 10);

    // Stored exactly once
    assert!(apply(&state, &sid, |_| Ok(())).unwrap().0.record.is_none());
    let conn = state.db.lock().unwrap();
    assert_eq!(db::get_lesson_progress(&conn, user_id).unwrap()[0].completions, 1);
  }
}
