use axum::{
  extract::{Path, State},
  Json,
};
use serde::{Deserialize, Serialize};

use crate::db::{self, try_lock};
use crate::domain::{SubscriptionTier, User};
use crate::error::AppResult;
use crate::state::AppState;

use super::require_user;

#[derive(Debug, Clone, Serialize)]
pub struct Plan {
  pub tier: SubscriptionTier,
  pub name: &'static str,
  /// Monthly price in cents; billing happens outside this service
  pub monthly_price_cents: u32,
  pub perks: &'static [&'static str],
}

pub const PLANS: [Plan; 3] = [
  Plan {
    tier: SubscriptionTier::Free,
    name: "Free",
    monthly_price_cents: 0,
    perks: &["All lessons", "Basic shop items"],
  },
  Plan {
    tier: SubscriptionTier::Plus,
    name: "Plus",
    monthly_price_cents: 499,
    perks: &["All lessons", "Plus shop items", "Double XP boosts"],
  },
  Plan {
    tier: SubscriptionTier::Premium,
    name: "Premium",
    monthly_price_cents: 999,
    perks: &["All lessons", "Every shop item", "Exclusive cosmetics"],
  },
];

#[derive(Debug, Deserialize)]
pub struct ChangeSubscriptionRequest {
  pub tier: SubscriptionTier,
}

/// GET /api/subscriptions/plans
pub async fn list_plans() -> Json<Vec<Plan>> {
  Json(PLANS.to_vec())
}

/// PUT /api/users/{id}/subscription
pub async fn change_subscription(
  State(state): State<AppState>,
  Path(user_id): Path<i64>,
  Json(request): Json<ChangeSubscriptionRequest>,
) -> AppResult<Json<User>> {
  let conn = try_lock(&state.db)?;
  let previous = require_user(&conn, user_id)?.subscription_tier;
  db::set_subscription_tier(&conn, user_id, request.tier)?;
  tracing::info!(user_id, from = %previous, to = %request.tier, "Subscription changed");
  Ok(Json(require_user(&conn, user_id)?))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_plans_cover_every_tier_in_price_order() {
    let tiers: Vec<_> = PLANS.iter().map(|p| p.tier).collect();
    assert_eq!(tiers, SubscriptionTier::all().to_vec());
    assert!(PLANS.windows(2).all(|w| w[0].monthly_price_cents < w[1].monthly_price_cents));
  }
}
