use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::sql_text_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendStatus {
  Pending,
  Accepted,
  Declined,
  Blocked,
}

impl FriendStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Accepted => "accepted",
      Self::Declined => "declined",
      Self::Blocked => "blocked",
    }
  }
}

impl std::str::FromStr for FriendStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" => Ok(Self::Pending),
      "accepted" => Ok(Self::Accepted),
      "declined" => Ok(Self::Declined),
      "blocked" => Ok(Self::Blocked),
      _ => Err(format!("Invalid friend status: {}", s)),
    }
  }
}

sql_text_enum!(FriendStatus);

/// One side of a friendship row, seen from `user_id`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Friend {
  pub user_id: i64,
  pub friend_id: i64,
  pub friend_username: String,
  pub friend_display_name: String,
  pub status: FriendStatus,
  /// True when `user_id` sent the request
  pub outgoing: bool,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
  Pending,
  Accepted,
  Declined,
  Cancelled,
}

impl TradeStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Accepted => "accepted",
      Self::Declined => "declined",
      Self::Cancelled => "cancelled",
    }
  }

  pub fn is_final(&self) -> bool {
    !matches!(self, Self::Pending)
  }
}

impl std::str::FromStr for TradeStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" => Ok(Self::Pending),
      "accepted" => Ok(Self::Accepted),
      "declined" => Ok(Self::Declined),
      "cancelled" => Ok(Self::Cancelled),
      _ => Err(format!("Invalid trade status: {}", s)),
    }
  }
}

sql_text_enum!(TradeStatus);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeOffer {
  pub id: i64,
  pub from_user_id: i64,
  pub to_user_id: i64,
  pub offered_item_id: i64,
  /// None for a gift
  pub requested_item_id: Option<i64>,
  pub status: TradeStatus,
  pub created_at: DateTime<Utc>,
  pub resolved_at: Option<DateTime<Utc>>,
}
