//! In-memory storage for running lesson sessions.
//!
//! Sessions are keyed by a random id handed to the client when the lesson
//! starts. They expire after `SESSION_EXPIRY_HOURS` without access.

use crate::config;
use crate::player::LessonSession;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Session entry with last access time for expiration
struct SessionEntry {
  session: LessonSession,
  last_access: DateTime<Utc>,
}

/// Shared session store, cloned into every handler through `AppState`
#[derive(Clone, Default)]
pub struct SessionStore {
  inner: Arc<Mutex<HashMap<String, SessionEntry>>>,
}

impl SessionStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// A panic while holding the lock leaves the map itself intact, so keep using it
  fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Store a new session and return its id
  pub fn insert(&self, session: LessonSession) -> String {
    let mut sessions = self.lock();

    // Clean up expired sessions occasionally (~10% chance)
    if rand::random::<u8>() < config::SESSION_CLEANUP_THRESHOLD {
      cleanup_expired(&mut sessions);
    }

    let mut id = generate_session_id();
    while sessions.contains_key(&id) {
      id = generate_session_id();
    }
    sessions.insert(
      id.clone(),
      SessionEntry {
        session,
        last_access: Utc::now(),
      },
    );
    id
  }

  /// Run `f` against a live session, refreshing its access time.
  /// Returns None if the id is unknown or expired.
  pub fn with_session<T>(&self, id: &str, f: impl FnOnce(&mut LessonSession) -> T) -> Option<T> {
    let mut sessions = self.lock();
    let expiry = Utc::now() - Duration::hours(config::SESSION_EXPIRY_HOURS);

    match sessions.get_mut(id) {
      Some(entry) if entry.last_access > expiry => {
        entry.last_access = Utc::now();
        Some(f(&mut entry.session))
      }
      Some(_) => {
        sessions.remove(id);
        None
      }
      None => None,
    }
  }

  pub fn remove(&self, id: &str) -> Option<LessonSession> {
    self.lock().remove(id).map(|entry| entry.session)
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  #[cfg(test)]
  fn backdate(&self, id: &str, hours: i64) {
    if let Some(entry) = self.lock().get_mut(id) {
      entry.last_access = Utc::now() - Duration::hours(hours);
    }
  }
}

/// Clean up expired sessions
fn cleanup_expired(sessions: &mut HashMap<String, SessionEntry>) {
  let expiry = Utc::now() - Duration::hours(config::SESSION_EXPIRY_HOURS);
  let before = sessions.len();
  sessions.retain(|_, entry| entry.last_access > expiry);
  let removed = before - sessions.len();
  if removed > 0 {
    tracing::debug!("Expired {} lesson sessions", removed);
  }
}

/// Generate a new session ID
pub fn generate_session_id() -> String {
  use rand::Rng;
  let mut rng = rand::rng();
  (0..32)
    .map(|_| {
      let idx = rng.random_range(0..36);
      if idx < 10 {
        (b'0' + idx) as char
      } else {
        (b'a' + idx - 10) as char
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::content::expand_items;
  use crate::player::Phase;

  fn session() -> LessonSession {
    LessonSession::new("es-1", "es", 1, expand_items(&[], "es", 1))
  }

  #[test]
  fn test_session_id_format() {
    let id = generate_session_id();
    assert_eq!(id.len(), 32);
    assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
  }

  #[test]
  fn test_insert_and_mutate() {
    let store = SessionStore::new();
    let id = store.insert(session());
    assert_eq!(store.len(), 1);

    let hearts = store.with_session(&id, |s| {
      s.refill_hearts();
      s.hearts()
    });
    assert_eq!(hearts, Some(config::MAX_HEARTS));
    assert_eq!(store.with_session(&id, |s| s.phase()), Some(Phase::Presenting));
  }

  #[test]
  fn test_unknown_session() {
    let store = SessionStore::new();
    assert!(store.with_session("nope", |s| s.score()).is_none());
  }

  #[test]
  fn test_expired_session_is_dropped() {
    let store = SessionStore::new();
    let id = store.insert(session());
    store.backdate(&id, config::SESSION_EXPIRY_HOURS + 1);
    assert!(store.with_session(&id, |s| s.score()).is_none());
    assert!(store.is_empty());
  }

  #[test]
  fn test_remove() {
    let store = SessionStore::new();
    let id = store.insert(session());
    assert!(store.remove(&id).is_some());
    assert!(store.remove(&id).is_none());
  }
}
