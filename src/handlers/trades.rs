use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  Json,
};
use serde::Deserialize;

use crate::db::{self, try_lock, NewTrade, TradeAction};
use crate::domain::{TradeOffer, TradeStatus};
use crate::error::AppResult;
use crate::state::AppState;

use super::{award_achievements, require_user};

#[derive(Debug, Deserialize)]
pub struct TradeQuery {
  pub user_id: i64,
  pub status: Option<TradeStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveTradeRequest {
  /// Who is acting: the recipient for accept/decline, the proposer for cancel
  pub user_id: i64,
  pub action: TradeAction,
}

/// GET /api/trades?user_id=&status=
pub async fn list_trades(
  State(state): State<AppState>,
  Query(query): Query<TradeQuery>,
) -> AppResult<Json<Vec<TradeOffer>>> {
  let conn = try_lock(&state.db)?;
  require_user(&conn, query.user_id)?;
  Ok(Json(db::list_trades(&conn, query.user_id, query.status)?))
}

/// POST /api/trades
pub async fn propose_trade(
  State(state): State<AppState>,
  Json(new_trade): Json<NewTrade>,
) -> AppResult<(StatusCode, Json<TradeOffer>)> {
  let conn = try_lock(&state.db)?;
  let trade = db::propose_trade(&conn, &new_trade)?;
  Ok((StatusCode::CREATED, Json(trade)))
}

/// PATCH /api/trades/{id}
pub async fn resolve_trade(
  State(state): State<AppState>,
  Path(trade_id): Path<i64>,
  Json(request): Json<ResolveTradeRequest>,
) -> AppResult<Json<TradeOffer>> {
  let conn = try_lock(&state.db)?;
  let trade = db::resolve_trade(&conn, trade_id, request.user_id, request.action)?;
  if trade.status == TradeStatus::Accepted {
    award_achievements(&conn, &[trade.from_user_id, trade.to_user_id]);
  }
  Ok(Json(trade))
}
