//! Shop catalogue, purchases and inventory.
//!
//! XP doubles as currency: buying an item spends XP.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result};
use serde::Serialize;

use crate::domain::{ShopItem, UserItem};

use super::{parse_timestamp, users, ActionError, ActionResult};

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseReceipt {
    pub item: ShopItem,
    /// How many the user owns after the purchase
    pub quantity: i64,
    pub xp_remaining: i64,
}

pub fn list_shop_items(conn: &Connection) -> Result<Vec<ShopItem>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, description, category, price_xp, required_tier
         FROM shop_items ORDER BY price_xp, id",
    )?;
    let items = stmt.query_map([], row_to_shop_item)?;
    items.collect()
}

pub fn get_shop_item(conn: &Connection, id: i64) -> Result<Option<ShopItem>> {
    conn.query_row(
        "SELECT id, name, description, category, price_xp, required_tier
         FROM shop_items WHERE id = ?1",
        params![id],
        row_to_shop_item,
    )
    .optional()
}

/// Buy one unit of `item_id`. XP check, tier check, deduct and grant happen
/// in a single transaction.
pub fn purchase_item(conn: &Connection, user_id: i64, item_id: i64) -> ActionResult<PurchaseReceipt> {
    let tx = conn.unchecked_transaction()?;

    let user = users::get_user(&tx, user_id)?
        .ok_or_else(|| ActionError::NotFound("User not found".to_string()))?;
    let item = get_shop_item(&tx, item_id)?
        .ok_or_else(|| ActionError::NotFound("Item not found".to_string()))?;

    if user.subscription_tier < item.required_tier {
        return Err(ActionError::Forbidden(format!(
            "{} requires a {} subscription",
            item.name, item.required_tier
        )));
    }
    if user.xp < item.price_xp {
        return Err(ActionError::Conflict(format!(
            "Not enough XP: {} costs {}, you have {}",
            item.name, item.price_xp, user.xp
        )));
    }

    users::add_xp(&tx, user_id, -item.price_xp)?;
    grant_item(&tx, user_id, item_id, 1)?;
    let quantity = item_quantity(&tx, user_id, item_id)?;
    tx.commit()?;

    tracing::info!("User {} bought {} for {} XP", user_id, item.name, item.price_xp);
    Ok(PurchaseReceipt {
        xp_remaining: user.xp - item.price_xp,
        quantity,
        item,
    })
}

pub fn get_inventory(conn: &Connection, user_id: i64) -> Result<Vec<UserItem>> {
    let mut stmt = conn.prepare(
        "SELECT ui.item_id, si.name, si.category, ui.quantity, ui.acquired_at
         FROM user_items ui JOIN shop_items si ON si.id = ui.item_id
         WHERE ui.user_id = ?1 AND ui.quantity > 0
         ORDER BY ui.acquired_at, ui.item_id",
    )?;
    let items = stmt.query_map(params![user_id], |row| {
        let acquired_at: String = row.get(4)?;
        Ok(UserItem {
            item_id: row.get(0)?,
            name: row.get(1)?,
            category: row.get(2)?,
            quantity: row.get(3)?,
            acquired_at: parse_timestamp(&acquired_at),
        })
    })?;
    items.collect()
}

pub fn item_quantity(conn: &Connection, user_id: i64, item_id: i64) -> Result<i64> {
    let quantity: Option<i64> = conn
        .query_row(
            "SELECT quantity FROM user_items WHERE user_id = ?1 AND item_id = ?2",
            params![user_id, item_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(quantity.unwrap_or(0))
}

/// Add `count` units to a user's stack, creating it if needed
pub fn grant_item(conn: &Connection, user_id: i64, item_id: i64, count: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO user_items (user_id, item_id, quantity, acquired_at) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(user_id, item_id) DO UPDATE SET quantity = quantity + excluded.quantity",
        params![user_id, item_id, count, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

/// Remove one unit from a user's stack. Returns false if they don't own any.
pub fn take_item(conn: &Connection, user_id: i64, item_id: i64) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE user_items SET quantity = quantity - 1
         WHERE user_id = ?1 AND item_id = ?2 AND quantity > 0",
        params![user_id, item_id],
    )?;
    conn.execute(
        "DELETE FROM user_items WHERE user_id = ?1 AND item_id = ?2 AND quantity <= 0",
        params![user_id, item_id],
    )?;
    Ok(changed > 0)
}

pub fn count_purchased_items(conn: &Connection, user_id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COALESCE(SUM(quantity), 0) FROM user_items WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )
}

fn row_to_shop_item(row: &rusqlite::Row) -> Result<ShopItem> {
    Ok(ShopItem {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        price_xp: row.get(4)?,
        required_tier: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SubscriptionTier;
    use crate::testing::TestEnv;

    #[test]
    fn test_list_sorted_by_price() {
        let env = TestEnv::new().unwrap();
        let items = list_shop_items(&env.conn).unwrap();
        assert!(items.windows(2).all(|w| w[0].price_xp <= w[1].price_xp));
    }

    #[test]
    fn test_purchase_deducts_xp_and_grants_item() {
        let env = TestEnv::new().unwrap();
        let user = env.user("buyer");
        env.grant_xp(user, 120);
        let refill = env.shop_item("Heart Refill");

        let receipt = purchase_item(&env.conn, user, refill).unwrap();
        assert_eq!(receipt.xp_remaining, 70);
        assert_eq!(receipt.quantity, 1);

        let receipt = purchase_item(&env.conn, user, refill).unwrap();
        assert_eq!(receipt.xp_remaining, 20);
        assert_eq!(receipt.quantity, 2);

        let inventory = get_inventory(&env.conn, user).unwrap();
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory[0].quantity, 2);
    }

    #[test]
    fn test_purchase_without_enough_xp() {
        let env = TestEnv::new().unwrap();
        let user = env.user("broke");
        env.grant_xp(user, 10);
        let refill = env.shop_item("Heart Refill");

        let err = purchase_item(&env.conn, user, refill).unwrap_err();
        assert!(matches!(err, ActionError::Conflict(_)));
        // Nothing changed
        let user_row = users::get_user(&env.conn, user).unwrap().unwrap();
        assert_eq!(user_row.xp, 10);
        assert!(get_inventory(&env.conn, user).unwrap().is_empty());
    }

    #[test]
    fn test_purchase_requires_tier() {
        let env = TestEnv::new().unwrap();
        let user = env.user("freebie");
        env.grant_xp(user, 1000);
        let crown = env.shop_item("Royal Crown");

        let err = purchase_item(&env.conn, user, crown).unwrap_err();
        assert!(matches!(err, ActionError::Forbidden(_)));

        users::set_subscription_tier(&env.conn, user, SubscriptionTier::Premium).unwrap();
        assert!(purchase_item(&env.conn, user, crown).is_ok());
    }

    #[test]
    fn test_purchase_unknown_item() {
        let env = TestEnv::new().unwrap();
        let user = env.user("buyer");
        assert!(matches!(
            purchase_item(&env.conn, user, 9999),
            Err(ActionError::NotFound(_))
        ));
    }

    #[test]
    fn test_take_item_removes_empty_stack() {
        let env = TestEnv::new().unwrap();
        let user = env.user("holder");
        let frame = env.shop_item("Golden Frame");
        grant_item(&env.conn, user, frame, 1).unwrap();

        assert!(take_item(&env.conn, user, frame).unwrap());
        assert!(!take_item(&env.conn, user, frame).unwrap());
        assert_eq!(item_quantity(&env.conn, user, frame).unwrap(), 0);
    }
}
