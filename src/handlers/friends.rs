use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  Json,
};
use serde::Deserialize;

use crate::db::{self, try_lock};
use crate::domain::{Friend, FriendStatus};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

use super::{award_achievements, require_user};

#[derive(Debug, Deserialize)]
pub struct FriendsQuery {
  pub status: Option<FriendStatus>,
}

#[derive(Debug, Deserialize)]
pub struct AddFriendRequest {
  pub friend_id: i64,
}

/// GET /api/users/{id}/friends
pub async fn list_friends(
  State(state): State<AppState>,
  Path(user_id): Path<i64>,
  Query(query): Query<FriendsQuery>,
) -> AppResult<Json<Vec<Friend>>> {
  let conn = try_lock(&state.db)?;
  require_user(&conn, user_id)?;
  Ok(Json(db::list_friends(&conn, user_id, query.status)?))
}

/// POST /api/users/{id}/friends
pub async fn add_friend(
  State(state): State<AppState>,
  Path(user_id): Path<i64>,
  Json(request): Json<AddFriendRequest>,
) -> AppResult<(StatusCode, Json<Friend>)> {
  let conn = try_lock(&state.db)?;
  let friend = db::send_friend_request(&conn, user_id, request.friend_id)?;
  if friend.status == FriendStatus::Accepted {
    award_achievements(&conn, &[user_id, request.friend_id]);
  }
  Ok((StatusCode::CREATED, Json(friend)))
}

/// POST /api/users/{id}/friends/{friend_id}/accept
pub async fn accept_friend(
  State(state): State<AppState>,
  Path((user_id, friend_id)): Path<(i64, i64)>,
) -> AppResult<Json<Friend>> {
  let conn = try_lock(&state.db)?;
  let friend = db::accept_friend_request(&conn, user_id, friend_id)?;
  award_achievements(&conn, &[user_id, friend_id]);
  Ok(Json(friend))
}

/// POST /api/users/{id}/friends/{friend_id}/decline
pub async fn decline_friend(
  State(state): State<AppState>,
  Path((user_id, friend_id)): Path<(i64, i64)>,
) -> AppResult<Json<Friend>> {
  let conn = try_lock(&state.db)?;
  Ok(Json(db::decline_friend_request(&conn, user_id, friend_id)?))
}

/// POST /api/users/{id}/friends/{friend_id}/block
pub async fn block_friend(
  State(state): State<AppState>,
  Path((user_id, friend_id)): Path<(i64, i64)>,
) -> AppResult<Json<Friend>> {
  let conn = try_lock(&state.db)?;
  require_user(&conn, user_id)?;
  Ok(Json(db::block_user(&conn, user_id, friend_id)?))
}

/// DELETE /api/users/{id}/friends/{friend_id}
pub async fn remove_friend(
  State(state): State<AppState>,
  Path((user_id, friend_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
  let conn = try_lock(&state.db)?;
  if db::remove_friend(&conn, user_id, friend_id)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(AppError::not_found("Friend"))
  }
}
