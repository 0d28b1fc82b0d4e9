use axum::{
  extract::{Query, State},
  Json,
};
use serde::Deserialize;

use crate::config::{clamp_limit, DEFAULT_LEADERBOARD_LIMIT};
use crate::db::{self, try_lock, LeaderboardEntry};
use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
  pub limit: Option<i64>,
}

/// GET /api/leaderboard?limit=
pub async fn leaderboard(
  State(state): State<AppState>,
  Query(query): Query<LeaderboardQuery>,
) -> AppResult<Json<Vec<LeaderboardEntry>>> {
  let limit = clamp_limit(query.limit, DEFAULT_LEADERBOARD_LIMIT);
  let conn = try_lock(&state.db)?;
  Ok(Json(db::get_leaderboard(&conn, limit)?))
}
