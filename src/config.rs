//! Application configuration constants.
//!
//! Gameplay numbers and server settings live here so handlers and the
//! lesson player never hardcode them.

use serde::Deserialize;
use std::path::PathBuf;

use crate::paths;

// ==================== File Configuration ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct AppConfig {
  database: Option<DatabaseConfig>,
  content: Option<ContentConfig>,
  server: Option<ServerConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabaseConfig {
  path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentConfig {
  lessons_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerConfig {
  port: Option<u16>,
}

fn read_config_file() -> AppConfig {
  let contents = match std::fs::read_to_string("config.toml") {
    Ok(contents) => contents,
    Err(_) => return AppConfig::default(),
  };
  match toml::from_str::<AppConfig>(&contents) {
    Ok(config) => config,
    Err(e) => {
      tracing::warn!("Ignoring malformed config.toml: {}", e);
      AppConfig::default()
    }
  }
}

/// Load database path with priority: config.toml > .env > default
pub fn load_database_path() -> PathBuf {
  let _ = dotenvy::dotenv();

  if let Some(path) = read_config_file().database.and_then(|db| db.path) {
    tracing::info!("Using database from config.toml: {}", path);
    return PathBuf::from(path);
  }

  if let Ok(path) = std::env::var("DATABASE_PATH") {
    tracing::info!("Using database from DATABASE_PATH env: {}", path);
    return PathBuf::from(path);
  }

  let default = PathBuf::from(paths::db_path());
  tracing::info!("Using default database path: {}", default.display());
  default
}

/// Load lesson content directory with priority: config.toml > .env > default
pub fn load_lessons_dir() -> PathBuf {
  let _ = dotenvy::dotenv();

  if let Some(dir) = read_config_file().content.and_then(|c| c.lessons_dir) {
    tracing::info!("Using lessons from config.toml: {}", dir);
    return PathBuf::from(dir);
  }

  if let Ok(dir) = std::env::var("LESSONS_DIR") {
    tracing::info!("Using lessons from LESSONS_DIR env: {}", dir);
    return PathBuf::from(dir);
  }

  PathBuf::from(paths::lessons_dir())
}

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Default server port
pub const SERVER_PORT: u16 = 3000;

/// Resolve the port: config.toml > PORT env > default
pub fn server_port() -> u16 {
  if let Some(port) = read_config_file().server.and_then(|s| s.port) {
    return port;
  }
  std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse().ok())
    .unwrap_or(SERVER_PORT)
}

/// Get the full server bind address
pub fn server_bind_addr() -> String {
  format!("{}:{}", SERVER_ADDR, server_port())
}

// ==================== Session Configuration ====================

/// Lesson sessions expire after this many hours without access
pub const SESSION_EXPIRY_HOURS: i64 = 6;

/// Probability threshold for session cleanup (0-255, lower = more frequent)
/// Value of 25 means ~10% chance (25/256) on each session access
pub const SESSION_CLEANUP_THRESHOLD: u8 = 25;

// ==================== Lesson Player ====================

/// Every lesson session is padded or truncated to this many items
pub const SESSION_SIZE: usize = 100;

/// Items per batch before the summary screen
pub const BATCH_SIZE: usize = 25;

/// Hearts at session start and after a refill
pub const MAX_HEARTS: u8 = 5;

/// Points for a correct typed or selected answer
pub const CORRECT_POINTS: u32 = 10;

/// Points for a flashcard rated "ok"
pub const FLASHCARD_OK_POINTS: u32 = 5;

/// Points for a flashcard rated "easy"
pub const FLASHCARD_EASY_POINTS: u32 = 10;

/// Number of distractor choices in multiple choice mode
pub const DISTRACTOR_COUNT: usize = 3;

/// Extra pairs shown next to the current item in matching mode
pub const MATCHING_EXTRA_PAIRS: usize = 3;

// ==================== Progression ====================

/// XP needed per level
pub const XP_PER_LEVEL: i64 = 100;

/// Level for a given XP total (level 1 at 0 XP)
pub fn level_for_xp(xp: i64) -> i64 {
  xp.max(0) / XP_PER_LEVEL + 1
}

// ==================== Query Limits ====================

/// Default leaderboard size
pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 10;

/// Upper bound on any `limit` query parameter
pub const MAX_QUERY_LIMIT: i64 = 100;

/// Clamp a client-supplied limit into 1..=MAX_QUERY_LIMIT
pub fn clamp_limit(limit: Option<i64>, default: i64) -> i64 {
  limit.unwrap_or(default).clamp(1, MAX_QUERY_LIMIT)
}
