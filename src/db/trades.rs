//! Item trades between friends.
//!
//! A trade offers one of the proposer's items, optionally in exchange for
//! one of the recipient's. Without a requested item it is a gift.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result};
use serde::Deserialize;

use crate::domain::{TradeOffer, TradeStatus};

use super::{friends, parse_timestamp, shop, users, ActionError, ActionResult};

const TRADE_COLUMNS: &str = "id, from_user_id, to_user_id, offered_item_id, requested_item_id, \
    status, created_at, resolved_at";

#[derive(Debug, Clone, Deserialize)]
pub struct NewTrade {
    pub from_user_id: i64,
    pub to_user_id: i64,
    pub offered_item_id: i64,
    #[serde(default)]
    pub requested_item_id: Option<i64>,
}

/// What a participant can do with a pending trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    /// Recipient takes the deal
    Accept,
    /// Recipient turns it down
    Decline,
    /// Proposer withdraws it
    Cancel,
}

pub fn get_trade(conn: &Connection, id: i64) -> Result<Option<TradeOffer>> {
    conn.query_row(
        &format!("SELECT {} FROM trades WHERE id = ?1", TRADE_COLUMNS),
        params![id],
        row_to_trade,
    )
    .optional()
}

/// Trades the user sent or received, newest first
pub fn list_trades(conn: &Connection, user_id: i64, status: Option<TradeStatus>) -> Result<Vec<TradeOffer>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM trades
         WHERE (from_user_id = ?1 OR to_user_id = ?1) AND (?2 IS NULL OR status = ?2)
         ORDER BY created_at DESC, id DESC",
        TRADE_COLUMNS
    ))?;
    let trades = stmt.query_map(params![user_id, status], row_to_trade)?;
    trades.collect()
}

pub fn propose_trade(conn: &Connection, new_trade: &NewTrade) -> ActionResult<TradeOffer> {
    let NewTrade {
        from_user_id: from,
        to_user_id: to,
        offered_item_id: offered,
        requested_item_id: requested,
    } = *new_trade;

    if from == to {
        return Err(ActionError::Invalid("You can't trade with yourself".to_string()));
    }
    for id in [from, to] {
        if !users::user_exists(conn, id)? {
            return Err(ActionError::NotFound("User not found".to_string()));
        }
    }
    if !friends::are_friends(conn, from, to)? {
        return Err(ActionError::Forbidden("You can only trade with friends".to_string()));
    }
    if shop::item_quantity(conn, from, offered)? == 0 {
        return Err(ActionError::Conflict("You don't own the offered item".to_string()));
    }
    if let Some(requested) = requested
        && shop::item_quantity(conn, to, requested)? == 0
    {
        return Err(ActionError::Conflict("Your friend doesn't own the requested item".to_string()));
    }

    conn.execute(
        "INSERT INTO trades (from_user_id, to_user_id, offered_item_id, requested_item_id, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![from, to, offered, requested, TradeStatus::Pending, Utc::now().to_rfc3339()],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!("Trade {} proposed: user {} -> user {}", id, from, to);
    get_trade(conn, id)?.ok_or_else(|| ActionError::NotFound("Trade not found".to_string()))
}

/// Apply `action` on behalf of `user_id`
pub fn resolve_trade(conn: &Connection, trade_id: i64, user_id: i64, action: TradeAction) -> ActionResult<TradeOffer> {
    let trade = get_trade(conn, trade_id)?
        .ok_or_else(|| ActionError::NotFound("Trade not found".to_string()))?;

    let allowed = match action {
        TradeAction::Accept | TradeAction::Decline => trade.to_user_id == user_id,
        TradeAction::Cancel => trade.from_user_id == user_id,
    };
    if !allowed {
        return Err(ActionError::Forbidden("You can't change this trade".to_string()));
    }
    if trade.status.is_final() {
        return Err(ActionError::Conflict(format!("Trade is already {}", trade.status)));
    }

    match action {
        TradeAction::Accept => accept(conn, &trade)?,
        TradeAction::Decline => set_status(conn, trade.id, TradeStatus::Declined)?,
        TradeAction::Cancel => set_status(conn, trade.id, TradeStatus::Cancelled)?,
    }
    get_trade(conn, trade_id)?.ok_or_else(|| ActionError::NotFound("Trade not found".to_string()))
}

/// Swap ownership. The two users must still be friends and both sides must
/// still hold their items, otherwise nothing moves.
fn accept(conn: &Connection, trade: &TradeOffer) -> ActionResult<()> {
    if !friends::are_friends(conn, trade.from_user_id, trade.to_user_id)? {
        return Err(ActionError::Conflict("You are no longer friends with this trader".to_string()));
    }
    let tx = conn.unchecked_transaction()?;

    if !shop::take_item(&tx, trade.from_user_id, trade.offered_item_id)? {
        return Err(ActionError::Conflict("The offered item is no longer available".to_string()));
    }
    shop::grant_item(&tx, trade.to_user_id, trade.offered_item_id, 1)?;

    if let Some(requested) = trade.requested_item_id {
        if !shop::take_item(&tx, trade.to_user_id, requested)? {
            return Err(ActionError::Conflict("You no longer own the requested item".to_string()));
        }
        shop::grant_item(&tx, trade.from_user_id, requested, 1)?;
    }

    set_status(&tx, trade.id, TradeStatus::Accepted)?;
    tx.commit()?;
    tracing::info!("Trade {} accepted", trade.id);
    Ok(())
}

fn set_status(conn: &Connection, id: i64, status: TradeStatus) -> Result<()> {
    conn.execute(
        "UPDATE trades SET status = ?1, resolved_at = ?2 WHERE id = ?3",
        params![status, Utc::now().to_rfc3339(), id],
    )?;
    Ok(())
}

pub fn count_completed_trades(conn: &Connection, user_id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM trades
         WHERE (from_user_id = ?1 OR to_user_id = ?1) AND status = 'accepted'",
        params![user_id],
        |row| row.get(0),
    )
}

fn row_to_trade(row: &rusqlite::Row) -> Result<TradeOffer> {
    let created_at: String = row.get(6)?;
    let resolved_at: Option<String> = row.get(7)?;
    Ok(TradeOffer {
        id: row.get(0)?,
        from_user_id: row.get(1)?,
        to_user_id: row.get(2)?,
        offered_item_id: row.get(3)?,
        requested_item_id: row.get(4)?,
        status: row.get(5)?,
        created_at: parse_timestamp(&created_at),
        resolved_at: resolved_at.as_deref().map(parse_timestamp),
    })
}
