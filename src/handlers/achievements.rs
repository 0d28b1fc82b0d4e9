use axum::{
  extract::{Path, State},
  Json,
};

use crate::db::{self, try_lock};
use crate::domain::{Achievement, UserAchievement};
use crate::error::AppResult;
use crate::state::AppState;

use super::require_user;

/// GET /api/achievements
pub async fn list_achievements(State(state): State<AppState>) -> AppResult<Json<Vec<Achievement>>> {
  let conn = try_lock(&state.db)?;
  Ok(Json(db::list_achievements(&conn)?))
}

/// GET /api/users/{id}/achievements
pub async fn list_user_achievements(
  State(state): State<AppState>,
  Path(user_id): Path<i64>,
) -> AppResult<Json<Vec<UserAchievement>>> {
  let conn = try_lock(&state.db)?;
  require_user(&conn, user_id)?;
  Ok(Json(db::list_user_achievements(&conn, user_id)?))
}
