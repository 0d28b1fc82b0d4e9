//! User accounts, profiles and the XP leaderboard

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result};
use serde::{Deserialize, Serialize};

use crate::config::{level_for_xp, MAX_HEARTS};
use crate::domain::{SubscriptionTier, User};

use super::{parse_date, parse_timestamp};

const USER_COLUMNS: &str = "id, username, display_name, native_language, learning_language, xp, \
    streak_days, hearts, subscription_tier, last_active_date, created_at";

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub native_language: Option<String>,
    #[serde(default)]
    pub learning_language: Option<String>,
}

/// Partial profile update; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub native_language: Option<String>,
    pub learning_language: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub user_id: i64,
    pub username: String,
    pub display_name: String,
    pub xp: i64,
    pub level: i64,
    pub streak_days: i64,
}

/// Usernames: 3-32 chars of ASCII letters, digits, `_` or `-`
pub fn validate_username(username: &str) -> std::result::Result<(), String> {
    let len = username.chars().count();
    if !(3..=32).contains(&len) {
        return Err("Username must be 3-32 characters".to_string());
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err("Username may only contain letters, digits, '_' and '-'".to_string());
    }
    Ok(())
}

pub fn create_user(conn: &Connection, new_user: &NewUser) -> Result<User> {
    let username = new_user.username.trim();
    let display_name = new_user
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(username);
    let native = new_user.native_language.as_deref().unwrap_or("en");

    conn.execute(
        "INSERT INTO users (username, display_name, native_language, learning_language, hearts, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            username,
            display_name,
            native,
            new_user.learning_language,
            MAX_HEARTS,
            Utc::now().to_rfc3339()
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!("Created user {} ({})", username, id);
    get_user(conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

pub fn get_user(conn: &Connection, id: i64) -> Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
        params![id],
        row_to_user,
    )
    .optional()
}

pub fn get_user_by_username(conn: &Connection, username: &str) -> Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS),
        params![username],
        row_to_user,
    )
    .optional()
}

pub fn user_exists(conn: &Connection, id: i64) -> Result<bool> {
    conn.query_row("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)", params![id], |row| {
        row.get(0)
    })
}

/// Apply a profile update. Returns the fresh user, or None if it doesn't exist.
pub fn update_profile(conn: &Connection, id: i64, update: &ProfileUpdate) -> Result<Option<User>> {
    if let Some(name) = update.display_name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        conn.execute("UPDATE users SET display_name = ?1 WHERE id = ?2", params![name, id])?;
    }
    if let Some(native) = &update.native_language {
        conn.execute("UPDATE users SET native_language = ?1 WHERE id = ?2", params![native, id])?;
    }
    if let Some(learning) = &update.learning_language {
        // Empty string clears the learning language
        let learning = Some(learning.as_str()).filter(|s| !s.is_empty());
        conn.execute("UPDATE users SET learning_language = ?1 WHERE id = ?2", params![learning, id])?;
    }
    get_user(conn, id)
}

pub fn set_subscription_tier(conn: &Connection, id: i64, tier: SubscriptionTier) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE users SET subscription_tier = ?1 WHERE id = ?2",
        params![tier, id],
    )?;
    Ok(changed > 0)
}

pub fn set_hearts(conn: &Connection, id: i64, hearts: u8) -> Result<()> {
    conn.execute("UPDATE users SET hearts = ?1 WHERE id = ?2", params![hearts, id])?;
    Ok(())
}

/// Add (or with a negative amount, remove) XP
pub fn add_xp(conn: &Connection, id: i64, amount: i64) -> Result<()> {
    conn.execute("UPDATE users SET xp = xp + ?1 WHERE id = ?2", params![amount, id])?;
    Ok(())
}

/// Top users by XP. Ties go to the older account.
pub fn get_leaderboard(conn: &Connection, limit: i64) -> Result<Vec<LeaderboardEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, display_name, xp, streak_days FROM users
         ORDER BY xp DESC, id ASC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], |row| {
        let xp: i64 = row.get(3)?;
        Ok(LeaderboardEntry {
            rank: 0,
            user_id: row.get(0)?,
            username: row.get(1)?,
            display_name: row.get(2)?,
            xp,
            level: level_for_xp(xp),
            streak_days: row.get(4)?,
        })
    })?;

    let mut entries = rows.collect::<Result<Vec<_>>>()?;
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i as i64 + 1;
    }
    Ok(entries)
}

pub(crate) fn row_to_user(row: &rusqlite::Row) -> Result<User> {
    let xp: i64 = row.get(5)?;
    let last_active: Option<String> = row.get(9)?;
    let created_at: String = row.get(10)?;

    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        display_name: row.get(2)?,
        native_language: row.get(3)?,
        learning_language: row.get(4)?,
        xp,
        level: level_for_xp(xp),
        streak_days: row.get(6)?,
        hearts: row.get(7)?,
        subscription_tier: row.get(8)?,
        last_active_date: last_active.as_deref().and_then(parse_date),
        created_at: parse_timestamp(&created_at),
    })
}
