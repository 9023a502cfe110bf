use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stock position of one item at one location within one tenant.
///
/// `quantity` is signed on-hand stock; a negative value is a backorder
/// signal, not an error. `reserved_quantity` is the portion earmarked by
/// in-flight transfers and is never negative. Rows are created lazily on
/// first movement and never deleted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Uuid")]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub item_id: Uuid,
    pub location_id: Uuid,
    pub quantity: i32,
    pub reserved_quantity: i32,
    /// Bumped on every mutation; all writes go through conditional updates.
    pub version: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// On-hand minus reserved; the quantity a new reservation may claim.
    pub fn available_quantity(&self) -> i32 {
        self.quantity - self.reserved_quantity
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(quantity: i32, reserved: i32) -> Model {
        Model {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            quantity,
            reserved_quantity: reserved,
            version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn available_is_on_hand_minus_reserved() {
        assert_eq!(record(50, 20).available_quantity(), 30);
        assert_eq!(record(0, 0).available_quantity(), 0);
    }

    #[test]
    fn available_may_go_negative_via_on_hand_only() {
        // Sales decrement can push on-hand below the reserved portion.
        assert_eq!(record(-5, 0).available_quantity(), -5);
        assert_eq!(record(3, 10).available_quantity(), -7);
    }
}
