use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::sql_text_enum;
use super::SubscriptionTier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
  PowerUp,
  Cosmetic,
  Outfit,
}

impl ItemCategory {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::PowerUp => "power_up",
      Self::Cosmetic => "cosmetic",
      Self::Outfit => "outfit",
    }
  }
}

impl std::str::FromStr for ItemCategory {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "power_up" => Ok(Self::PowerUp),
      "cosmetic" => Ok(Self::Cosmetic),
      "outfit" => Ok(Self::Outfit),
      _ => Err(format!("Invalid item category: {}", s)),
    }
  }
}

sql_text_enum!(ItemCategory);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopItem {
  pub id: i64,
  pub name: String,
  pub description: String,
  pub category: ItemCategory,
  pub price_xp: i64,
  /// Minimum plan needed to buy this item
  pub required_tier: SubscriptionTier,
}

/// An owned stack of a shop item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserItem {
  pub item_id: i64,
  pub name: String,
  pub category: ItemCategory,
  pub quantity: i64,
  pub acquired_at: DateTime<Utc>,
}
