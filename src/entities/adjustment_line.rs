use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Absolute before/after snapshot for one item within an adjustment.
/// `adjusted_quantity` is stored redundantly for reporting.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "adjustment_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Uuid")]
    pub id: Uuid,
    pub adjustment_id: Uuid,
    pub item_id: Uuid,
    pub before_quantity: i32,
    pub after_quantity: i32,
    pub adjusted_quantity: i32,
    pub notes: Option<String>,
    pub serial_numbers: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::adjustment::Entity",
        from = "Column::AdjustmentId",
        to = "super::adjustment::Column::Id"
    )]
    Adjustment,
}

impl Related<super::adjustment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Adjustment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
