use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One manual stock correction event at a single location. The ledger is
/// written at creation time; a DRAFT adjustment is a submitted count, not an
/// unsubmitted proposal.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "adjustments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Uuid")]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub adjustment_number: String,
    pub adjustment_date: Date,
    pub location_id: Uuid,
    pub adjustment_type: AdjustmentType,
    pub reason: String,
    pub status: AdjustmentStatus,
    pub created_by_id: Uuid,
    pub approved_by_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentType {
    #[sea_orm(string_value = "STOCK_COUNT")]
    #[strum(serialize = "STOCK_COUNT")]
    StockCount,
    #[sea_orm(string_value = "DAMAGE")]
    #[strum(serialize = "DAMAGE")]
    Damage,
    #[sea_orm(string_value = "THEFT")]
    #[strum(serialize = "THEFT")]
    Theft,
    #[sea_orm(string_value = "EXPIRED")]
    #[strum(serialize = "EXPIRED")]
    Expired,
    #[sea_orm(string_value = "WRITE_OFF")]
    #[strum(serialize = "WRITE_OFF")]
    WriteOff,
    #[sea_orm(string_value = "CORRECTION")]
    #[strum(serialize = "CORRECTION")]
    Correction,
    #[sea_orm(string_value = "OTHER")]
    #[strum(serialize = "OTHER")]
    Other,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentStatus {
    #[sea_orm(string_value = "DRAFT")]
    #[strum(serialize = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "APPROVED")]
    #[strum(serialize = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "COMPLETED")]
    #[strum(serialize = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "CANCELLED")]
    #[strum(serialize = "CANCELLED")]
    Cancelled,
}

impl AdjustmentStatus {
    pub fn can_approve(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Cancellation is allowed from every state except CANCELLED itself.
    pub fn can_cancel(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::adjustment_line::Entity")]
    AdjustmentLine,
}

impl Related<super::adjustment_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdjustmentLine.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn only_draft_can_be_approved() {
        for s in AdjustmentStatus::iter() {
            assert_eq!(s.can_approve(), matches!(s, AdjustmentStatus::Draft));
        }
    }

    #[test]
    fn cancelled_is_the_only_uncancellable_state() {
        for s in AdjustmentStatus::iter() {
            assert_eq!(s.can_cancel(), !matches!(s, AdjustmentStatus::Cancelled));
        }
    }
}
