use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
  pub id: i64,
  pub code: String,
  pub name: String,
  pub description: String,
  pub xp_reward: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAchievement {
  pub achievement: Achievement,
  pub earned_at: DateTime<Utc>,
}
