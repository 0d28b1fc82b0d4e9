pub mod achievements;
pub mod friends;
pub mod languages;
pub mod leaderboard;
pub mod sessions;
pub mod shop;
pub mod subscriptions;
pub mod trades;
pub mod users;

use rusqlite::Connection;

use crate::db;
use crate::domain::User;
use crate::error::{AppError, AppResult};

/// Load a user or fail with 404
pub(crate) fn require_user(conn: &Connection, user_id: i64) -> AppResult<User> {
  db::get_user(conn, user_id)?.ok_or_else(|| AppError::not_found("User"))
}

/// Award whatever the users now qualify for. Failures here never fail the
/// request that triggered them.
pub(crate) fn award_achievements(conn: &Connection, user_ids: &[i64]) -> Vec<crate::domain::Achievement> {
  use crate::db::LogOnError;

  user_ids
    .iter()
    .flat_map(|&id| {
      db::evaluate_achievements(conn, id).log_warn_default("Failed to evaluate achievements")
    })
    .collect()
}

pub use achievements::{list_achievements, list_user_achievements};
pub use friends::{accept_friend, add_friend, block_friend, decline_friend, list_friends, remove_friend};
pub use languages::{get_lesson_items, list_languages, list_lessons};
pub use leaderboard::leaderboard;
pub use sessions::{
  abandon_session, advance, continue_batch, get_presentation, get_session, rate_flashcard,
  refill_hearts, restart_batch, set_mode, skip, start_review, start_session, submit_answer,
};
pub use shop::{inventory, list_shop_items, purchase};
pub use subscriptions::{change_subscription, list_plans};
pub use trades::{list_trades, propose_trade, resolve_trade};
pub use users::{create_user, get_user, update_user, user_stats};
