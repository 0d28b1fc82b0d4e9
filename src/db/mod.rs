pub mod achievements;
pub mod friends;
pub mod languages;
pub mod progress;
pub mod schema;
pub mod shop;
pub mod trades;
pub mod users;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Result};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::content::phrasebook;
use crate::domain::{ItemCategory, SubscriptionTier};

// Re-export all public items from submodules
pub use achievements::*;
pub use friends::*;
pub use languages::*;
pub use progress::*;
pub use schema::run_migrations;
pub use shop::*;
pub use trades::*;
pub use users::*;

pub type DbPool = Arc<Mutex<Connection>>;

/// Extension trait for logging errors before discarding them
pub trait LogOnError<T> {
    /// Log the error at warn level and return the default
    fn log_warn_default(self, context: &str) -> T
    where
        T: Default;
}

impl<T, E: std::fmt::Display> LogOnError<T> for std::result::Result<T, E> {
    fn log_warn_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("{}: {}", context, e);
                T::default()
            }
        }
    }
}

/// Error returned when database lock cannot be acquired
#[derive(Debug)]
pub struct DbLockError;

impl std::fmt::Display for DbLockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Database unavailable")
    }
}

impl std::error::Error for DbLockError {}

/// Try to acquire the database lock, returning an error if poisoned
pub fn try_lock(pool: &DbPool) -> std::result::Result<MutexGuard<'_, Connection>, DbLockError> {
    pool.lock().map_err(|_: PoisonError<_>| {
        tracing::error!("Database mutex poisoned - a thread panicked while holding the lock");
        DbLockError
    })
}

/// Failure of a multi-step mutation: either a rule said no, or SQLite did.
#[derive(Debug)]
pub enum ActionError {
    NotFound(String),
    /// Request makes no sense (e.g. befriending yourself)
    Invalid(String),
    /// Caller isn't allowed to do this (wrong tier, not their trade)
    Forbidden(String),
    /// Valid request that the current state can't satisfy
    Conflict(String),
    Db(rusqlite::Error),
}

impl std::fmt::Display for ActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionError::NotFound(msg)
            | ActionError::Invalid(msg)
            | ActionError::Forbidden(msg)
            | ActionError::Conflict(msg) => write!(f, "{}", msg),
            ActionError::Db(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for ActionError {}

impl From<rusqlite::Error> for ActionError {
    fn from(e: rusqlite::Error) -> Self {
        ActionError::Db(e)
    }
}

pub type ActionResult<T> = std::result::Result<T, ActionError>;

pub fn init_db(path: &Path) -> Result<DbPool> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let conn = Connection::open(path)?;
    init_conn(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// In-memory database with schema and seed data (tests, throwaway servers)
pub fn init_memory_db() -> Result<DbPool> {
    let conn = Connection::open_in_memory()?;
    init_conn(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

fn init_conn(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    run_migrations(conn)?;
    seed_languages(conn)?;
    seed_shop_items(conn)?;
    seed_achievements(conn)?;
    Ok(())
}

// ==================== Row helpers ====================

/// Parse an RFC 3339 timestamp column, falling back to now for bad data
pub(crate) fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

// ==================== Seed data ====================

/// Languages come from the built-in phrasebook table
pub fn seed_languages(conn: &Connection) -> Result<()> {
    for lang in phrasebook::LANGUAGES {
        conn.execute(
            "INSERT OR IGNORE INTO languages (code, name, native_name, script) VALUES (?1, ?2, ?3, ?4)",
            params![lang.code, lang.name, lang.native_name, lang.script],
        )?;
    }
    Ok(())
}

pub fn seed_shop_items(conn: &Connection) -> Result<()> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM shop_items", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(());
    }

    let items = [
        ("Heart Refill", "Restores all hearts", ItemCategory::PowerUp, 50, SubscriptionTier::Free),
        ("Streak Freeze", "Keeps your streak alive for one missed day", ItemCategory::PowerUp, 100, SubscriptionTier::Free),
        ("Double XP", "Doubles XP for the next lesson", ItemCategory::PowerUp, 150, SubscriptionTier::Plus),
        ("Golden Frame", "A shiny profile frame", ItemCategory::Cosmetic, 200, SubscriptionTier::Free),
        ("Night Theme", "Dark lesson background", ItemCategory::Cosmetic, 120, SubscriptionTier::Plus),
        ("Scholar Robe", "Outfit for your mascot", ItemCategory::Outfit, 300, SubscriptionTier::Free),
        ("Royal Crown", "Premium mascot outfit", ItemCategory::Outfit, 500, SubscriptionTier::Premium),
    ];

    for (name, description, category, price, tier) in items {
        conn.execute(
            "INSERT INTO shop_items (name, description, category, price_xp, required_tier)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![name, description, category, price, tier],
        )?;
    }
    tracing::debug!("Seeded {} shop items", items.len());
    Ok(())
}

pub fn seed_achievements(conn: &Connection) -> Result<()> {
    for rule in achievements::RULES {
        conn.execute(
            "INSERT OR IGNORE INTO achievements (code, name, description, xp_reward) VALUES (?1, ?2, ?3, ?4)",
            params![rule.code, rule.name, rule.description, rule.xp_reward],
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_memory_db_seeds() {
        let pool = init_memory_db().unwrap();
        let conn = try_lock(&pool).unwrap();
        let langs: i64 = conn
            .query_row("SELECT COUNT(*) FROM languages", [], |row| row.get(0))
            .unwrap();
        assert_eq!(langs as usize, phrasebook::LANGUAGES.len());
        let items: i64 = conn
            .query_row("SELECT COUNT(*) FROM shop_items", [], |row| row.get(0))
            .unwrap();
        assert!(items > 0);
    }

    #[test]
    fn test_seeding_is_idempotent() {
        let pool = init_memory_db().unwrap();
        let conn = try_lock(&pool).unwrap();
        seed_shop_items(&conn).unwrap();
        seed_achievements(&conn).unwrap();
        seed_languages(&conn).unwrap();
        let items: i64 = conn
            .query_row("SELECT COUNT(*) FROM shop_items", [], |row| row.get(0))
            .unwrap();
        assert_eq!(items, 7);
    }

    #[test]
    fn test_log_warn_default() {
        let r: std::result::Result<i64, String> = Err("boom".into());
        assert_eq!(r.log_warn_default("test"), 0);
    }

    #[test]
    fn test_parse_timestamp_roundtrip() {
        let now = Utc::now();
        let parsed = parse_timestamp(&now.to_rfc3339());
        assert_eq!(parsed.timestamp(), now.timestamp());
    }
}
