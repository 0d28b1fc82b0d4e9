//! Test utilities for database setup.
//!
//! Provides helpers that reuse authoritative schema initialization,
//! eliminating schema duplication in test code.

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test environment with a seeded database and an empty lessons directory.
///
/// Everything lives in a single temporary directory, cleaned up on drop.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    /// Connection with full schema and seed data (languages, shop, achievements)
    pub conn: Connection,
}

impl TestEnv {
    /// Create a test environment using the same initialization as startup.
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let conn = Connection::open(temp.path().join("lingoquest.db"))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        crate::db::schema::run_migrations(&conn)?;
        crate::db::seed_languages(&conn)?;
        crate::db::seed_shop_items(&conn)?;
        crate::db::seed_achievements(&conn)?;

        Ok(Self { temp, conn })
    }

    /// Get the temporary directory path for creating test files.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Lessons root inside the temp dir (created on demand)
    pub fn lessons_dir(&self) -> PathBuf {
        let dir = self.temp.path().join("lessons");
        std::fs::create_dir_all(&dir).ok();
        dir
    }

    /// Insert a bare user and return its id
    pub fn user(&self, username: &str) -> i64 {
        let new_user = crate::db::NewUser {
            username: username.to_string(),
            display_name: None,
            native_language: None,
            learning_language: None,
        };
        crate::db::create_user(&self.conn, &new_user)
            .expect("create test user")
            .id
    }

    /// Give a user XP without going through a lesson
    pub fn grant_xp(&self, user_id: i64, xp: i64) {
        crate::db::add_xp(&self.conn, user_id, xp).expect("grant xp");
    }

    /// Id of a seeded shop item by name
    pub fn shop_item(&self, name: &str) -> i64 {
        self.conn
            .query_row("SELECT id FROM shop_items WHERE name = ?1", [name], |row| row.get(0))
            .expect("seeded shop item")
    }
}
