//! End-to-end tests over the HTTP router with an in-memory database.

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use lingoquest::{db, paths, router, state::AppState};

struct TestApp {
  server: TestServer,
  _lessons: TempDir,
}

fn app() -> TestApp {
  let lessons = TempDir::new().unwrap();
  let lesson_path = paths::lesson_path(lessons.path(), "ja", 1);
  std::fs::create_dir_all(lesson_path.parent().unwrap()).unwrap();
  std::fs::write(
    &lesson_path,
    json!({
      "title": "Greetings",
      "items": [
        { "id": 1, "type": "vocabulary", "question": "hello", "answer": "konnichiwa", "pronunciation": "kon-ni-chi-wa" },
        { "id": 2, "type": "vocabulary", "question": "thank you", "answer": "arigatou" },
        { "id": 3, "type": "vocabulary", "question": "goodbye", "answer": "sayonara" },
        { "id": 4, "type": "vocabulary", "question": "yes", "answer": "hai" },
        { "id": 5, "type": "vocabulary", "question": "water", "answer": "mizu" }
      ]
    })
    .to_string(),
  )
  .unwrap();

  let pool = db::init_memory_db().unwrap();
  let state = AppState::new(pool, lessons.path().to_path_buf());
  TestApp {
    server: TestServer::new(router(state)).unwrap(),
    _lessons: lessons,
  }
}

async fn create_user(server: &TestServer, username: &str) -> i64 {
  let response = server
    .post("/api/users")
    .json(&json!({ "username": username, "learning_language": "ja" }))
    .await;
  response.assert_status(StatusCode::CREATED);
  response.json::<Value>()["id"].as_i64().unwrap()
}

async fn lesson_answers(server: &TestServer, lesson_id: &str) -> Vec<String> {
  let body: Value = server.get(&format!("/api/lessons/{}/items", lesson_id)).await.json();
  body["items"]
    .as_array()
    .unwrap()
    .iter()
    .map(|item| item["answer"].as_str().unwrap().to_string())
    .collect()
}

async fn answer_and_advance(server: &TestServer, sid: &str, answer: &str) -> Value {
  let response = server
    .post(&format!("/api/sessions/{}/answer", sid))
    .json(&json!({ "answer": answer }))
    .await;
  response.assert_status_ok();
  let response = server.post(&format!("/api/sessions/{}/advance", sid)).await;
  response.assert_status_ok();
  response.json()
}

/// Play the whole lesson correctly and return the completing response
async fn complete_lesson(server: &TestServer, user_id: i64) -> Value {
  let answers = lesson_answers(server, "ja-1").await;
  let started: Value = server
    .post("/api/sessions")
    .json(&json!({ "lesson_id": "ja-1", "user_id": user_id }))
    .await
    .json();
  let sid = started["session_id"].as_str().unwrap().to_string();

  let mut last = Value::Null;
  for answer in &answers {
    last = answer_and_advance(server, &sid, answer).await;
    if last["session"]["phase"] == "batch_complete" {
      server
        .post(&format!("/api/sessions/{}/continue", sid))
        .await
        .assert_status_ok();
    }
  }
  last
}

#[tokio::test]
async fn test_user_create_get_and_duplicate() {
  let app = app();
  let id = create_user(&app.server, "hana").await;

  let user: Value = app.server.get(&format!("/api/users/{}", id)).await.json();
  assert_eq!(user["username"], "hana");
  assert_eq!(user["hearts"], 5);
  assert_eq!(user["subscription_tier"], "free");

  let duplicate = app
    .server
    .post("/api/users")
    .json(&json!({ "username": "hana" }))
    .await;
  duplicate.assert_status(StatusCode::CONFLICT);
  assert!(duplicate.json::<Value>()["error"].is_string());
}

#[tokio::test]
async fn test_update_profile_rejects_unknown_language() {
  let app = app();
  let id = create_user(&app.server, "kenji").await;

  let response = app
    .server
    .patch(&format!("/api/users/{}", id))
    .json(&json!({ "learning_language": "xx" }))
    .await;
  response.assert_status(StatusCode::BAD_REQUEST);

  let response = app
    .server
    .patch(&format!("/api/users/{}", id))
    .json(&json!({ "display_name": "Kenji", "learning_language": "ko" }))
    .await;
  response.assert_status_ok();
  let user: Value = response.json();
  assert_eq!(user["display_name"], "Kenji");
  assert_eq!(user["learning_language"], "ko");
}

#[tokio::test]
async fn test_unknown_user_is_json_404() {
  let app = app();
  let response = app.server.get("/api/users/999").await;
  response.assert_status_not_found();
  let body: Value = response.json();
  assert_eq!(body.as_object().unwrap().len(), 1);
  assert!(body["error"].as_str().unwrap().contains("User"));
}

#[tokio::test]
async fn test_languages_and_lessons() {
  let app = app();
  let languages: Value = app.server.get("/api/languages").await.json();
  assert!(languages.as_array().unwrap().iter().any(|l| l["code"] == "ja"));

  let lessons: Value = app.server.get("/api/languages/ja/lessons").await.json();
  assert_eq!(lessons[0]["lessonId"], "ja-1");
  assert_eq!(lessons[0]["itemCount"], 5);

  app
    .server
    .get("/api/languages/..%2Fetc/lessons")
    .await
    .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_lesson_items_always_hundred() {
  let app = app();
  assert_eq!(lesson_answers(&app.server, "ja-1").await.len(), 100);
  // No file on disk: phrasebook filler only
  assert_eq!(lesson_answers(&app.server, "es-7").await.len(), 100);

  app
    .server
    .get("/api/lessons/nonsense/items")
    .await
    .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_first_batch_reaches_summary() {
  let app = app();
  let answers = lesson_answers(&app.server, "ja-1").await;

  let response = app
    .server
    .post("/api/sessions")
    .json(&json!({ "lesson_id": "ja-1" }))
    .await;
  response.assert_status(StatusCode::CREATED);
  let started: Value = response.json();
  let sid = started["session_id"].as_str().unwrap().to_string();
  assert_eq!(started["session"]["phase"], "presenting");
  assert_eq!(started["session"]["total_items"], 100);
  assert_eq!(started["presentation"]["mode"], "multiple-choice");

  let mut last = Value::Null;
  for answer in &answers[..25] {
    last = answer_and_advance(&app.server, &sid, answer).await;
  }
  assert_eq!(last["session"]["phase"], "batch_complete");
  assert_eq!(last["session"]["correct_answers"], 25);
  assert_eq!(last["session"]["hearts"], 5);
  assert_eq!(last["session"]["batch"]["correct"], 25);
  assert!(last["presentation"].is_null());

  // Answering from the summary screen is not a valid transition
  let response = app
    .server
    .post(&format!("/api/sessions/{}/answer", sid))
    .json(&json!({ "answer": "hai" }))
    .await;
  response.assert_status(StatusCode::CONFLICT);

  app
    .server
    .post(&format!("/api/sessions/{}/continue", sid))
    .await
    .assert_status_ok();
  let view: Value = app.server.get(&format!("/api/sessions/{}", sid)).await.json();
  assert_eq!(view["session"]["phase"], "presenting");
  assert_eq!(view["session"]["batch_number"], 2);
}

#[tokio::test]
async fn test_wrong_answer_costs_heart() {
  let app = app();
  let started: Value = app
    .server
    .post("/api/sessions")
    .json(&json!({ "lesson_id": "ja-1", "mode": "writing" }))
    .await
    .json();
  let sid = started["session_id"].as_str().unwrap();
  assert_eq!(started["presentation"]["mode"], "writing");

  let answered: Value = app
    .server
    .post(&format!("/api/sessions/{}/answer", sid))
    .json(&json!({ "answer": "definitely wrong" }))
    .await
    .json();
  assert_eq!(answered["session"]["hearts"], 4);
  assert_eq!(answered["session"]["streak"], 0);
  assert_eq!(answered["session"]["last_outcome"]["expected"], "konnichiwa");
}

#[tokio::test]
async fn test_flashcard_mode_requires_rating() {
  let app = app();
  let started: Value = app
    .server
    .post("/api/sessions")
    .json(&json!({ "lesson_id": "ja-1", "mode": "flashcard" }))
    .await
    .json();
  let sid = started["session_id"].as_str().unwrap();
  assert_eq!(started["presentation"]["back"], "konnichiwa");

  app
    .server
    .post(&format!("/api/sessions/{}/answer", sid))
    .json(&json!({ "answer": "konnichiwa" }))
    .await
    .assert_status(StatusCode::CONFLICT);

  let rated: Value = app
    .server
    .post(&format!("/api/sessions/{}/rate", sid))
    .json(&json!({ "rating": "easy" }))
    .await
    .json();
  assert_eq!(rated["session"]["phase"], "answered");
  assert_eq!(rated["session"]["score"], 10);
}

#[tokio::test]
async fn test_unknown_session_is_404() {
  let app = app();
  app
    .server
    .get("/api/sessions/doesnotexist")
    .await
    .assert_status_not_found();
  app
    .server
    .delete("/api/sessions/doesnotexist")
    .await
    .assert_status_not_found();
}

#[tokio::test]
async fn test_completed_lesson_is_recorded() {
  let app = app();
  let id = create_user(&app.server, "yuki").await;

  let last = complete_lesson(&app.server, id).await;
  assert_eq!(last["session"]["phase"], "lesson_complete");
  assert_eq!(last["record"]["xp_earned"], 1000);
  assert_eq!(last["record"]["new_best"], true);

  let stats: Value = app.server.get(&format!("/api/users/{}/stats", id)).await.json();
  // Lesson score plus the first_lesson reward
  assert_eq!(stats["xp"], 1010);
  assert_eq!(stats["streak_days"], 1);
  assert_eq!(stats["lessons_completed"], 1);

  let earned: Value = app
    .server
    .get(&format!("/api/users/{}/achievements", id))
    .await
    .json();
  let codes: Vec<&str> = earned
    .as_array()
    .unwrap()
    .iter()
    .map(|a| a["achievement"]["code"].as_str().unwrap())
    .collect();
  assert!(codes.contains(&"first_lesson"));
  assert!(codes.contains(&"xp_1000"));
}

#[tokio::test]
async fn test_purchase_without_xp_is_conflict() {
  let app = app();
  let id = create_user(&app.server, "sora").await;
  let items: Value = app.server.get("/api/shop/items").await.json();
  let item_id = items[0]["id"].as_i64().unwrap();

  let response = app
    .server
    .post("/api/shop/purchase")
    .json(&json!({ "user_id": id, "item_id": item_id }))
    .await;
  response.assert_status(StatusCode::CONFLICT);

  let inventory: Value = app.server.get(&format!("/api/users/{}/items", id)).await.json();
  assert!(inventory.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_friends_then_gift_trade() {
  let app = app();
  let aki = create_user(&app.server, "aki").await;
  let ren = create_user(&app.server, "ren").await;
  complete_lesson(&app.server, aki).await;

  // Friend request and acceptance
  let request = app
    .server
    .post(&format!("/api/users/{}/friends", aki))
    .json(&json!({ "friend_id": ren }))
    .await;
  request.assert_status(StatusCode::CREATED);
  assert_eq!(request.json::<Value>()["status"], "pending");

  let accepted: Value = app
    .server
    .post(&format!("/api/users/{}/friends/{}/accept", ren, aki))
    .await
    .json();
  assert_eq!(accepted["status"], "accepted");

  // Buy something to give away
  let items: Value = app.server.get("/api/shop/items").await.json();
  let cheapest = items[0]["id"].as_i64().unwrap();
  let bought: Value = app
    .server
    .post("/api/shop/purchase")
    .json(&json!({ "user_id": aki, "item_id": cheapest }))
    .await
    .json();
  assert_eq!(bought["quantity"], 1);
  assert_eq!(bought["xp_remaining"], 1010 - items[0]["price_xp"].as_i64().unwrap());

  let proposed = app
    .server
    .post("/api/trades")
    .json(&json!({ "from_user_id": aki, "to_user_id": ren, "offered_item_id": cheapest }))
    .await;
  proposed.assert_status(StatusCode::CREATED);
  let trade_id = proposed.json::<Value>()["id"].as_i64().unwrap();

  // Only the recipient can accept
  app
    .server
    .patch(&format!("/api/trades/{}", trade_id))
    .json(&json!({ "user_id": aki, "action": "accept" }))
    .await
    .assert_status(StatusCode::FORBIDDEN);

  let resolved: Value = app
    .server
    .patch(&format!("/api/trades/{}", trade_id))
    .json(&json!({ "user_id": ren, "action": "accept" }))
    .await
    .json();
  assert_eq!(resolved["status"], "accepted");

  let inventory: Value = app.server.get(&format!("/api/users/{}/items", ren)).await.json();
  assert_eq!(inventory[0]["item_id"], cheapest);
  let mine: Value = app.server.get(&format!("/api/users/{}/items", aki)).await.json();
  assert!(mine.as_array().unwrap().is_empty());

  let trades: Value = app
    .server
    .get("/api/trades")
    .add_query_param("user_id", ren)
    .add_query_param("status", "accepted")
    .await
    .json();
  assert_eq!(trades.as_array().unwrap().len(), 1);

  // Removing the friendship
  app
    .server
    .delete(&format!("/api/users/{}/friends/{}", aki, ren))
    .await
    .assert_status(StatusCode::NO_CONTENT);
  app
    .server
    .delete(&format!("/api/users/{}/friends/{}", aki, ren))
    .await
    .assert_status_not_found();
}

#[tokio::test]
async fn test_leaderboard_limit() {
  let app = app();
  for name in ["mika", "taro", "emi"] {
    create_user(&app.server, name).await;
  }

  let board: Value = app
    .server
    .get("/api/leaderboard")
    .add_query_param("limit", 2)
    .await
    .json();
  let board = board.as_array().unwrap();
  assert_eq!(board.len(), 2);
  assert_eq!(board[0]["rank"], 1);
}

#[tokio::test]
async fn test_subscription_change() {
  let app = app();
  let id = create_user(&app.server, "nao").await;

  let plans: Value = app.server.get("/api/subscriptions/plans").await.json();
  assert_eq!(plans.as_array().unwrap().len(), 3);

  let user: Value = app
    .server
    .put(&format!("/api/users/{}/subscription", id))
    .json(&json!({ "tier": "premium" }))
    .await
    .json();
  assert_eq!(user["subscription_tier"], "premium");

  app
    .server
    .put("/api/users/999/subscription")
    .json(&json!({ "tier": "plus" }))
    .await
    .assert_status_not_found();
}
