/// Store a string-backed enum as TEXT, using its `as_str` / `FromStr` pair.
macro_rules! sql_text_enum {
  ($ty:ty) => {
    impl rusqlite::types::ToSql for $ty {
      fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        Ok(rusqlite::types::ToSqlOutput::from(self.as_str()))
      }
    }

    impl rusqlite::types::FromSql for $ty {
      fn column_result(
        value: rusqlite::types::ValueRef<'_>,
      ) -> rusqlite::types::FromSqlResult<Self> {
        value
          .as_str()?
          .parse()
          .map_err(|e: String| rusqlite::types::FromSqlError::Other(e.into()))
      }
    }

    impl std::fmt::Display for $ty {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
      }
    }
  };
}

pub(crate) use sql_text_enum;

pub mod achievement;
pub mod quiz_item;
pub mod shop;
pub mod social;
pub mod user;

pub use achievement::{Achievement, UserAchievement};
pub use quiz_item::{ItemType, QuizItem};
pub use shop::{ItemCategory, ShopItem, UserItem};
pub use social::{Friend, FriendStatus, TradeOffer, TradeStatus};
pub use user::{DailyStat, Language, LessonProgress, SubscriptionTier, User};
