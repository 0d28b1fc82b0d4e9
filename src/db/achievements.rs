//! Achievement catalogue and automatic awarding

use chrono::Utc;
use rusqlite::{params, Connection, Result};

use crate::domain::{Achievement, UserAchievement};

use super::{count_completed_trades, count_friends, count_purchased_items, parse_timestamp, users};

/// What has to be reached to earn an achievement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    LessonsCompleted(i64),
    Xp(i64),
    StreakDays(i64),
    ItemsOwned(i64),
    TradesCompleted(i64),
    Friends(i64),
}

#[derive(Debug, Clone, Copy)]
pub struct AchievementRule {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub xp_reward: i64,
    pub criterion: Criterion,
}

pub const RULES: &[AchievementRule] = &[
    AchievementRule {
        code: "first_lesson",
        name: "First Steps",
        description: "Complete your first lesson",
        xp_reward: 10,
        criterion: Criterion::LessonsCompleted(1),
    },
    AchievementRule {
        code: "ten_lessons",
        name: "Dedicated Learner",
        description: "Complete 10 lessons",
        xp_reward: 50,
        criterion: Criterion::LessonsCompleted(10),
    },
    AchievementRule {
        code: "xp_100",
        name: "Century",
        description: "Earn 100 XP",
        xp_reward: 0,
        criterion: Criterion::Xp(100),
    },
    AchievementRule {
        code: "xp_1000",
        name: "Scholar",
        description: "Earn 1000 XP",
        xp_reward: 0,
        criterion: Criterion::Xp(1000),
    },
    AchievementRule {
        code: "streak_3",
        name: "On a Roll",
        description: "Keep a 3 day streak",
        xp_reward: 15,
        criterion: Criterion::StreakDays(3),
    },
    AchievementRule {
        code: "streak_7",
        name: "Week Warrior",
        description: "Keep a 7 day streak",
        xp_reward: 50,
        criterion: Criterion::StreakDays(7),
    },
    AchievementRule {
        code: "first_purchase",
        name: "Shopper",
        description: "Own an item from the shop",
        xp_reward: 5,
        criterion: Criterion::ItemsOwned(1),
    },
    AchievementRule {
        code: "first_trade",
        name: "Trader",
        description: "Complete a trade with a friend",
        xp_reward: 10,
        criterion: Criterion::TradesCompleted(1),
    },
    AchievementRule {
        code: "five_friends",
        name: "Social Butterfly",
        description: "Have 5 friends",
        xp_reward: 25,
        criterion: Criterion::Friends(5),
    },
];

/// Counters the criteria are checked against
#[derive(Debug, Clone, Copy, Default)]
pub struct AchievementProgress {
    pub lessons_completed: i64,
    pub xp: i64,
    pub streak_days: i64,
    pub items_owned: i64,
    pub trades_completed: i64,
    pub friends: i64,
}

impl Criterion {
    pub fn is_met(&self, p: &AchievementProgress) -> bool {
        match *self {
            Criterion::LessonsCompleted(n) => p.lessons_completed >= n,
            Criterion::Xp(n) => p.xp >= n,
            Criterion::StreakDays(n) => p.streak_days >= n,
            Criterion::ItemsOwned(n) => p.items_owned >= n,
            Criterion::TradesCompleted(n) => p.trades_completed >= n,
            Criterion::Friends(n) => p.friends >= n,
        }
    }
}

pub fn list_achievements(conn: &Connection) -> Result<Vec<Achievement>> {
    let mut stmt =
        conn.prepare("SELECT id, code, name, description, xp_reward FROM achievements ORDER BY id")?;
    let rows = stmt.query_map([], row_to_achievement)?;
    rows.collect()
}

pub fn list_user_achievements(conn: &Connection, user_id: i64) -> Result<Vec<UserAchievement>> {
    let mut stmt = conn.prepare(
        "SELECT a.id, a.code, a.name, a.description, a.xp_reward, ua.earned_at
         FROM user_achievements ua JOIN achievements a ON a.id = ua.achievement_id
         WHERE ua.user_id = ?1
         ORDER BY ua.earned_at, a.id",
    )?;
    let rows = stmt.query_map(params![user_id], |row| {
        let earned_at: String = row.get(5)?;
        Ok(UserAchievement {
            achievement: row_to_achievement(row)?,
            earned_at: parse_timestamp(&earned_at),
        })
    })?;
    rows.collect()
}

pub fn achievement_progress(conn: &Connection, user_id: i64) -> Result<AchievementProgress> {
    let (xp, streak_days): (i64, i64) = conn.query_row(
        "SELECT xp, streak_days FROM users WHERE id = ?1",
        params![user_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    let lessons_completed: i64 = conn.query_row(
        "SELECT COALESCE(SUM(lessons_completed), 0) FROM daily_stats WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;

    Ok(AchievementProgress {
        lessons_completed,
        xp,
        streak_days,
        items_owned: count_purchased_items(conn, user_id)?,
        trades_completed: count_completed_trades(conn, user_id)?,
        friends: count_friends(conn, user_id)?,
    })
}

/// Award every achievement the user now qualifies for and doesn't have yet.
/// Rewards are paid out as XP. Returns the newly earned achievements.
pub fn evaluate_achievements(conn: &Connection, user_id: i64) -> Result<Vec<Achievement>> {
    let progress = achievement_progress(conn, user_id)?;
    let now = Utc::now().to_rfc3339();
    let mut earned = Vec::new();

    for rule in RULES.iter().filter(|r| r.criterion.is_met(&progress)) {
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO user_achievements (user_id, achievement_id, earned_at)
             SELECT ?1, id, ?2 FROM achievements WHERE code = ?3",
            params![user_id, now, rule.code],
        )?;
        if inserted == 0 {
            continue;
        }
        if rule.xp_reward > 0 {
            users::add_xp(conn, user_id, rule.xp_reward)?;
        }
        let achievement = conn.query_row(
            "SELECT id, code, name, description, xp_reward FROM achievements WHERE code = ?1",
            params![rule.code],
            row_to_achievement,
        )?;
        tracing::info!("User {} earned achievement {}", user_id, rule.code);
        earned.push(achievement);
    }
    Ok(earned)
}

fn row_to_achievement(row: &rusqlite::Row) -> Result<Achievement> {
    Ok(Achievement {
        id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        xp_reward: row.get(4)?,
    })
}
