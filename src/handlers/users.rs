use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  Json,
};
use serde::Deserialize;

use crate::db::{self, try_lock, NewUser, ProfileUpdate, UserStats};
use crate::domain::User;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

use super::require_user;

/// Days of history on the stats screen
const DEFAULT_STATS_DAYS: i64 = 7;

/// POST /api/users
pub async fn create_user(
  State(state): State<AppState>,
  Json(new_user): Json<NewUser>,
) -> AppResult<(StatusCode, Json<User>)> {
  let username = new_user.username.trim();
  db::validate_username(username).map_err(AppError::BadRequest)?;

  let conn = try_lock(&state.db)?;
  if db::get_user_by_username(&conn, username)?.is_some() {
    return Err(AppError::Conflict("Username is already taken".to_string()));
  }
  check_language(&conn, new_user.learning_language.as_deref())?;

  let user = db::create_user(&conn, &new_user)?;
  Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users/{id}
pub async fn get_user(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<User>> {
  let conn = try_lock(&state.db)?;
  Ok(Json(require_user(&conn, id)?))
}

/// PATCH /api/users/{id}
pub async fn update_user(
  State(state): State<AppState>,
  Path(id): Path<i64>,
  Json(update): Json<ProfileUpdate>,
) -> AppResult<Json<User>> {
  let conn = try_lock(&state.db)?;
  check_language(&conn, update.learning_language.as_deref())?;
  db::update_profile(&conn, id, &update)?
    .map(Json)
    .ok_or_else(|| AppError::not_found("User"))
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
  pub days: Option<i64>,
}

/// GET /api/users/{id}/stats
pub async fn user_stats(
  State(state): State<AppState>,
  Path(id): Path<i64>,
  Query(query): Query<StatsQuery>,
) -> AppResult<Json<UserStats>> {
  let days = crate::config::clamp_limit(query.days, DEFAULT_STATS_DAYS);
  let conn = try_lock(&state.db)?;
  db::get_user_stats(&conn, id, days)?
    .map(Json)
    .ok_or_else(|| AppError::not_found("User"))
}

/// Learning language must be one we know, or empty to clear it
fn check_language(conn: &rusqlite::Connection, code: Option<&str>) -> AppResult<()> {
  match code {
    Some(code) if !code.is_empty() && db::get_language(conn, code)?.is_none() => {
      Err(AppError::BadRequest(format!("Unknown language: {}", code)))
    }
    _ => Ok(()),
  }
}
