use axum::{
  routing::{delete, get, patch, post, put},
  Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::handlers;
use crate::state::AppState;

/// Build the full HTTP surface. Raw lesson files are served under `/lessons`.
pub fn router(state: AppState) -> Router {
  let lessons = ServeDir::new(&state.lessons_dir);

  Router::new()
    // Users
    .route("/api/users", post(handlers::create_user))
    .route("/api/users/{id}", get(handlers::get_user).patch(handlers::update_user))
    .route("/api/users/{id}/stats", get(handlers::user_stats))
    .route("/api/users/{id}/items", get(handlers::inventory))
    .route("/api/users/{id}/achievements", get(handlers::list_user_achievements))
    .route("/api/users/{id}/subscription", put(handlers::change_subscription))
    // Friends
    .route("/api/users/{id}/friends", get(handlers::list_friends).post(handlers::add_friend))
    .route("/api/users/{id}/friends/{friend_id}", delete(handlers::remove_friend))
    .route("/api/users/{id}/friends/{friend_id}/accept", post(handlers::accept_friend))
    .route("/api/users/{id}/friends/{friend_id}/decline", post(handlers::decline_friend))
    .route("/api/users/{id}/friends/{friend_id}/block", post(handlers::block_friend))
    // Content
    .route("/api/languages", get(handlers::list_languages))
    .route("/api/languages/{code}/lessons", get(handlers::list_lessons))
    .route("/api/lessons/{lesson_id}/items", get(handlers::get_lesson_items))
    // Lesson player
    .route("/api/sessions", post(handlers::start_session))
    .route("/api/sessions/{sid}", get(handlers::get_session).delete(handlers::abandon_session))
    .route("/api/sessions/{sid}/presentation", get(handlers::get_presentation))
    .route("/api/sessions/{sid}/answer", post(handlers::submit_answer))
    .route("/api/sessions/{sid}/rate", post(handlers::rate_flashcard))
    .route("/api/sessions/{sid}/skip", post(handlers::skip))
    .route("/api/sessions/{sid}/advance", post(handlers::advance))
    .route("/api/sessions/{sid}/mode", post(handlers::set_mode))
    .route("/api/sessions/{sid}/continue", post(handlers::continue_batch))
    .route("/api/sessions/{sid}/restart-batch", post(handlers::restart_batch))
    .route("/api/sessions/{sid}/review", post(handlers::start_review))
    .route("/api/sessions/{sid}/refill", post(handlers::refill_hearts))
    // Shop and trading
    .route("/api/shop/items", get(handlers::list_shop_items))
    .route("/api/shop/purchase", post(handlers::purchase))
    .route("/api/trades", get(handlers::list_trades).post(handlers::propose_trade))
    .route("/api/trades/{id}", patch(handlers::resolve_trade))
    // Achievements, leaderboard, plans
    .route("/api/achievements", get(handlers::list_achievements))
    .route("/api/leaderboard", get(handlers::leaderboard))
    .route("/api/subscriptions/plans", get(handlers::list_plans))
    .nest_service("/lessons", lessons)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
