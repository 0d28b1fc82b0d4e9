use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::sql_text_enum;

/// Subscription plan. Payment happens elsewhere; this only records the tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
  #[default]
  Free,
  Plus,
  Premium,
}

impl SubscriptionTier {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Free => "free",
      Self::Plus => "plus",
      Self::Premium => "premium",
    }
  }

  pub fn all() -> [SubscriptionTier; 3] {
    [Self::Free, Self::Plus, Self::Premium]
  }
}

impl std::str::FromStr for SubscriptionTier {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "free" => Ok(Self::Free),
      "plus" => Ok(Self::Plus),
      "premium" => Ok(Self::Premium),
      _ => Err(format!("Invalid subscription tier: {}", s)),
    }
  }
}

sql_text_enum!(SubscriptionTier);

/// Account, profile and progress aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub id: i64,
  pub username: String,
  pub display_name: String,
  pub native_language: String,
  pub learning_language: Option<String>,
  pub xp: i64,
  pub level: i64,
  /// Consecutive days with at least one completed lesson
  pub streak_days: i64,
  pub hearts: u8,
  pub subscription_tier: SubscriptionTier,
  pub last_active_date: Option<NaiveDate>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Language {
  pub code: String,
  pub name: String,
  pub native_name: String,
  /// "latin" or the name of the writing system
  pub script: String,
}

impl Language {
  pub fn is_latin(&self) -> bool {
    self.script == "latin"
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStat {
  pub date: NaiveDate,
  pub xp_earned: i64,
  pub lessons_completed: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonProgress {
  pub language: String,
  pub lesson: u32,
  pub best_score: i64,
  pub completions: i64,
  pub last_completed_at: DateTime<Utc>,
}
