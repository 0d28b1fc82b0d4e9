use axum::{
  extract::{Path, State},
  Json,
};
use serde::{Deserialize, Serialize};

use crate::db::{self, try_lock, PurchaseReceipt};
use crate::domain::{Achievement, ShopItem, UserItem};
use crate::error::AppResult;
use crate::state::AppState;

use super::{award_achievements, require_user};

#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
  pub user_id: i64,
  pub item_id: i64,
}

#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
  #[serde(flatten)]
  pub receipt: PurchaseReceipt,
  pub new_achievements: Vec<Achievement>,
}

/// GET /api/shop/items
pub async fn list_shop_items(State(state): State<AppState>) -> AppResult<Json<Vec<ShopItem>>> {
  let conn = try_lock(&state.db)?;
  Ok(Json(db::list_shop_items(&conn)?))
}

/// POST /api/shop/purchase
pub async fn purchase(
  State(state): State<AppState>,
  Json(request): Json<PurchaseRequest>,
) -> AppResult<Json<PurchaseResponse>> {
  let conn = try_lock(&state.db)?;
  let receipt = db::purchase_item(&conn, request.user_id, request.item_id)?;
  let new_achievements = award_achievements(&conn, &[request.user_id]);
  Ok(Json(PurchaseResponse {
    receipt,
    new_achievements,
  }))
}

/// GET /api/users/{id}/items
pub async fn inventory(State(state): State<AppState>, Path(user_id): Path<i64>) -> AppResult<Json<Vec<UserItem>>> {
  let conn = try_lock(&state.db)?;
  require_user(&conn, user_id)?;
  Ok(Json(db::get_inventory(&conn, user_id)?))
}
