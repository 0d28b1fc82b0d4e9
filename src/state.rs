//! Application state shared by all handlers.

use std::path::PathBuf;

use crate::db::DbPool;
use crate::session::SessionStore;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Shared database connection (users, shop, social, progress)
    pub db: DbPool,

    /// Running lesson sessions
    pub sessions: SessionStore,

    /// Root of the static lesson files (data/lessons/)
    pub lessons_dir: PathBuf,
}

impl AppState {
    pub fn new(db: DbPool, lessons_dir: PathBuf) -> Self {
        Self {
            db,
            sessions: SessionStore::new(),
            lessons_dir,
        }
    }
}
