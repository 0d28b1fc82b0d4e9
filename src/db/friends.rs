//! Friend requests and the friends list.
//!
//! Each relationship is one row keyed by (requester, target). Listing reads
//! both directions and reports the row from the caller's side.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result};

use crate::domain::{Friend, FriendStatus};

use super::{parse_timestamp, users, ActionError, ActionResult};

/// The row linking two users, in whichever direction it was created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Friendship {
    pub requester_id: i64,
    pub target_id: i64,
    pub status: FriendStatus,
}

pub fn get_friendship(conn: &Connection, a: i64, b: i64) -> Result<Option<Friendship>> {
    conn.query_row(
        "SELECT user_id, friend_id, status FROM friends
         WHERE (user_id = ?1 AND friend_id = ?2) OR (user_id = ?2 AND friend_id = ?1)",
        params![a, b],
        |row| {
            Ok(Friendship {
                requester_id: row.get(0)?,
                target_id: row.get(1)?,
                status: row.get(2)?,
            })
        },
    )
    .optional()
}

pub fn are_friends(conn: &Connection, a: i64, b: i64) -> Result<bool> {
    Ok(matches!(
        get_friendship(conn, a, b)?,
        Some(Friendship {
            status: FriendStatus::Accepted,
            ..
        })
    ))
}

/// Send a friend request. If the other user already asked, this accepts theirs.
pub fn send_friend_request(conn: &Connection, user_id: i64, friend_id: i64) -> ActionResult<Friend> {
    if user_id == friend_id {
        return Err(ActionError::Invalid("You can't befriend yourself".to_string()));
    }
    for id in [user_id, friend_id] {
        if !users::user_exists(conn, id)? {
            return Err(ActionError::NotFound("User not found".to_string()));
        }
    }

    match get_friendship(conn, user_id, friend_id)? {
        Some(f) if f.status == FriendStatus::Blocked => {
            return Err(ActionError::Forbidden("You can't send a request to this user".to_string()));
        }
        Some(f) if f.status == FriendStatus::Accepted => {
            return Err(ActionError::Conflict("You are already friends".to_string()));
        }
        Some(f) if f.status == FriendStatus::Pending && f.requester_id == user_id => {
            return Err(ActionError::Conflict("Friend request already sent".to_string()));
        }
        Some(f) if f.status == FriendStatus::Pending => {
            // They asked first
            return accept_friend_request(conn, user_id, f.requester_id);
        }
        Some(_) => {
            // Declined earlier: start over with a fresh request
            delete_between(conn, user_id, friend_id)?;
        }
        None => {}
    }

    conn.execute(
        "INSERT INTO friends (user_id, friend_id, status, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![user_id, friend_id, FriendStatus::Pending, Utc::now().to_rfc3339()],
    )?;
    tracing::debug!("Friend request {} -> {}", user_id, friend_id);
    find_friend(conn, user_id, friend_id)
}

/// Accept the pending request `requester_id` sent to `user_id`
pub fn accept_friend_request(conn: &Connection, user_id: i64, requester_id: i64) -> ActionResult<Friend> {
    respond(conn, user_id, requester_id, FriendStatus::Accepted)
}

pub fn decline_friend_request(conn: &Connection, user_id: i64, requester_id: i64) -> ActionResult<Friend> {
    respond(conn, user_id, requester_id, FriendStatus::Declined)
}

fn respond(conn: &Connection, user_id: i64, requester_id: i64, status: FriendStatus) -> ActionResult<Friend> {
    let changed = conn.execute(
        "UPDATE friends SET status = ?1 WHERE user_id = ?2 AND friend_id = ?3 AND status = 'pending'",
        params![status, requester_id, user_id],
    )?;
    if changed == 0 {
        return Err(ActionError::NotFound("No pending friend request from this user".to_string()));
    }
    find_friend(conn, user_id, requester_id)
}

/// Remove a friend or withdraw a request. A block placed by the other user stays.
pub fn remove_friend(conn: &Connection, user_id: i64, friend_id: i64) -> Result<bool> {
    let changed = conn.execute(
        "DELETE FROM friends
         WHERE ((user_id = ?1 AND friend_id = ?2) OR (user_id = ?2 AND friend_id = ?1))
           AND NOT (status = 'blocked' AND user_id = ?2)",
        params![user_id, friend_id],
    )?;
    Ok(changed > 0)
}

/// Block a user, replacing any existing relationship
pub fn block_user(conn: &Connection, user_id: i64, target_id: i64) -> ActionResult<Friend> {
    if user_id == target_id {
        return Err(ActionError::Invalid("You can't block yourself".to_string()));
    }
    if !users::user_exists(conn, target_id)? {
        return Err(ActionError::NotFound("User not found".to_string()));
    }
    if let Some(f) = get_friendship(conn, user_id, target_id)?
        && f.status == FriendStatus::Blocked
        && f.requester_id == target_id
    {
        // Already blocked from the other side; keep their row
        return Err(ActionError::Conflict("This user is unavailable".to_string()));
    }

    let tx = conn.unchecked_transaction()?;
    delete_between(&tx, user_id, target_id)?;
    tx.execute(
        "INSERT INTO friends (user_id, friend_id, status, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![user_id, target_id, FriendStatus::Blocked, Utc::now().to_rfc3339()],
    )?;
    tx.commit()?;
    find_friend(conn, user_id, target_id)
}

/// Friends list from `user_id`'s side, optionally filtered by status.
/// Blocks placed by other users are never shown.
pub fn list_friends(conn: &Connection, user_id: i64, status: Option<FriendStatus>) -> Result<Vec<Friend>> {
    let mut stmt = conn.prepare(
        "SELECT f.user_id, f.friend_id, f.status, f.created_at, u.id, u.username, u.display_name
         FROM friends f
         JOIN users u ON u.id = CASE WHEN f.user_id = ?1 THEN f.friend_id ELSE f.user_id END
         WHERE (f.user_id = ?1 OR f.friend_id = ?1)
           AND NOT (f.status = 'blocked' AND f.friend_id = ?1)
         ORDER BY u.username",
    )?;
    let rows = stmt.query_map(params![user_id], |row| row_to_friend(row, user_id))?;

    let mut friends = rows.collect::<Result<Vec<_>>>()?;
    if let Some(status) = status {
        friends.retain(|f| f.status == status);
    }
    Ok(friends)
}

pub fn count_friends(conn: &Connection, user_id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM friends
         WHERE (user_id = ?1 OR friend_id = ?1) AND status = 'accepted'",
        params![user_id],
        |row| row.get(0),
    )
}

fn delete_between(conn: &Connection, a: i64, b: i64) -> Result<()> {
    conn.execute(
        "DELETE FROM friends WHERE (user_id = ?1 AND friend_id = ?2) OR (user_id = ?2 AND friend_id = ?1)",
        params![a, b],
    )?;
    Ok(())
}

fn find_friend(conn: &Connection, user_id: i64, other_id: i64) -> ActionResult<Friend> {
    list_friends(conn, user_id, None)?
        .into_iter()
        .find(|f| f.friend_id == other_id)
        .ok_or_else(|| ActionError::NotFound("Friend not found".to_string()))
}

fn row_to_friend(row: &rusqlite::Row, user_id: i64) -> Result<Friend> {
    let requester: i64 = row.get(0)?;
    let created_at: String = row.get(3)?;
    Ok(Friend {
        user_id,
        friend_id: row.get(4)?,
        friend_username: row.get(5)?,
        friend_display_name: row.get(6)?,
        status: row.get(2)?,
        outgoing: requester == user_id,
        created_at: parse_timestamp(&created_at),
    })
}
