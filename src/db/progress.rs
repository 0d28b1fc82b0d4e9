//! Recording finished lessons: XP, daily stats, per-lesson bests and the
//! day streak.

use chrono::{Duration, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};
use serde::Serialize;

use crate::config::{level_for_xp, XP_PER_LEVEL};
use crate::domain::{Achievement, DailyStat, LessonProgress};
use crate::player::LessonResult;

use super::{evaluate_achievements, parse_date, parse_timestamp, users, LogOnError};

/// What a completed lesson changed for the user
#[derive(Debug, Clone, Serialize)]
pub struct LessonRecord {
    pub xp_earned: i64,
    pub total_xp: i64,
    pub level: i64,
    pub leveled_up: bool,
    pub streak_days: i64,
    pub best_score: i64,
    pub new_best: bool,
    pub new_achievements: Vec<Achievement>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub user_id: i64,
    pub xp: i64,
    pub level: i64,
    pub xp_to_next_level: i64,
    /// Zero if the streak lapsed since the last lesson
    pub streak_days: i64,
    pub lessons_completed: i64,
    pub daily: Vec<DailyStat>,
    pub lessons: Vec<LessonProgress>,
}

/// Streak after completing a lesson on `today`
pub fn next_streak(last_active: Option<NaiveDate>, streak: i64, today: NaiveDate) -> i64 {
    match last_active {
        Some(last) if last == today => streak.max(1),
        Some(last) if last + Duration::days(1) == today => streak + 1,
        _ => 1,
    }
}

/// Streak as seen on `today` without a new lesson
pub fn current_streak(last_active: Option<NaiveDate>, streak: i64, today: NaiveDate) -> i64 {
    match last_active {
        Some(last) if last == today || last + Duration::days(1) == today => streak,
        _ => 0,
    }
}

pub fn record_lesson_result(conn: &Connection, user_id: i64, result: &LessonResult) -> Result<LessonRecord> {
    record_lesson_result_on(conn, user_id, result, Utc::now().date_naive())
}

/// Record a finished lesson as if completed on `today`.
pub fn record_lesson_result_on(
    conn: &Connection,
    user_id: i64,
    result: &LessonResult,
    today: NaiveDate,
) -> Result<LessonRecord> {
    let tx = conn.unchecked_transaction()?;
    let user = users::get_user(&tx, user_id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;

    let score = result.score as i64;
    let streak = next_streak(user.last_active_date, user.streak_days, today);
    let date = today.format("%Y-%m-%d").to_string();
    let now = Utc::now().to_rfc3339();

    tx.execute(
        "UPDATE users SET xp = xp + ?1, streak_days = ?2, last_active_date = ?3, hearts = ?4 WHERE id = ?5",
        params![score, streak, date, result.hearts_left, user_id],
    )?;

    tx.execute(
        "INSERT INTO daily_stats (user_id, date, xp_earned, lessons_completed) VALUES (?1, ?2, ?3, 1)
         ON CONFLICT(user_id, date) DO UPDATE SET
           xp_earned = xp_earned + excluded.xp_earned,
           lessons_completed = lessons_completed + 1",
        params![user_id, date, score],
    )?;

    let previous_best: Option<i64> = tx
        .query_row(
            "SELECT best_score FROM lesson_progress WHERE user_id = ?1 AND language = ?2 AND lesson = ?3",
            params![user_id, result.language, result.lesson],
            |row| row.get(0),
        )
        .optional()?;
    tx.execute(
        "INSERT INTO lesson_progress (user_id, language, lesson, best_score, completions, last_completed_at)
         VALUES (?1, ?2, ?3, ?4, 1, ?5)
         ON CONFLICT(user_id, language, lesson) DO UPDATE SET
           best_score = MAX(best_score, excluded.best_score),
           completions = completions + 1,
           last_completed_at = excluded.last_completed_at",
        params![user_id, result.language, result.lesson, score, now],
    )?;

    let lesson_xp: i64 =
        tx.query_row("SELECT xp FROM users WHERE id = ?1", params![user_id], |row| row.get(0))?;
    tx.commit()?;

    // The lesson is stored at this point; achievements are a bonus on top.
    let new_achievements =
        evaluate_achievements(conn, user_id).log_warn_default("Failed to evaluate achievements");
    let total_xp = lesson_xp + new_achievements.iter().map(|a| a.xp_reward).sum::<i64>();

    let level = level_for_xp(total_xp);
    tracing::info!(
        "User {} completed {} with score {} (streak {})",
        user_id,
        result.lesson_id,
        score,
        streak
    );

    Ok(LessonRecord {
        xp_earned: score,
        total_xp,
        level,
        leveled_up: level > user.level,
        streak_days: streak,
        best_score: previous_best.map_or(score, |best| best.max(score)),
        new_best: previous_best.is_none_or(|best| score > best),
        new_achievements,
    })
}

/// Most recent `days` daily stat rows, newest first
pub fn get_daily_stats(conn: &Connection, user_id: i64, days: i64) -> Result<Vec<DailyStat>> {
    let mut stmt = conn.prepare(
        "SELECT date, xp_earned, lessons_completed FROM daily_stats
         WHERE user_id = ?1 ORDER BY date DESC LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![user_id, days], |row| {
        let date: String = row.get(0)?;
        Ok((date, row.get(1)?, row.get(2)?))
    })?;

    let mut stats = Vec::new();
    for row in rows {
        let (date, xp_earned, lessons_completed) = row?;
        if let Some(date) = parse_date(&date) {
            stats.push(DailyStat {
                date,
                xp_earned,
                lessons_completed,
            });
        }
    }
    Ok(stats)
}

pub fn get_lesson_progress(conn: &Connection, user_id: i64) -> Result<Vec<LessonProgress>> {
    let mut stmt = conn.prepare(
        "SELECT language, lesson, best_score, completions, last_completed_at FROM lesson_progress
         WHERE user_id = ?1 ORDER BY language, lesson",
    )?;
    let rows = stmt.query_map(params![user_id], |row| {
        let last: String = row.get(4)?;
        Ok(LessonProgress {
            language: row.get(0)?,
            lesson: row.get(1)?,
            best_score: row.get(2)?,
            completions: row.get(3)?,
            last_completed_at: parse_timestamp(&last),
        })
    })?;
    rows.collect()
}

/// Profile numbers for the stats screen. None if the user doesn't exist.
pub fn get_user_stats(conn: &Connection, user_id: i64, days: i64) -> Result<Option<UserStats>> {
    let Some(user) = users::get_user(conn, user_id)? else {
        return Ok(None);
    };
    let lessons_completed: i64 = conn.query_row(
        "SELECT COALESCE(SUM(lessons_completed), 0) FROM daily_stats WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;

    Ok(Some(UserStats {
        user_id,
        xp: user.xp,
        level: user.level,
        xp_to_next_level: XP_PER_LEVEL - user.xp.rem_euclid(XP_PER_LEVEL),
        streak_days: current_streak(user.last_active_date, user.streak_days, Utc::now().date_naive()),
        lessons_completed,
        daily: get_daily_stats(conn, user_id, days)?,
        lessons: get_lesson_progress(conn, user_id)?,
    }))
}
