use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One intended stock move between two locations. Creation reserves the
/// quantity at the source; only completion moves physical stock.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Uuid")]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub transfer_number: String,
    pub transfer_date: Date,
    pub from_location_id: Uuid,
    pub to_location_id: Uuid,
    pub status: TransferStatus,
    pub notes: Option<String>,
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
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    #[sea_orm(string_value = "DRAFT")]
    #[strum(serialize = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "APPROVED")]
    #[strum(serialize = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "IN_TRANSIT")]
    #[strum(serialize = "IN_TRANSIT")]
    InTransit,
    #[sea_orm(string_value = "COMPLETED")]
    #[strum(serialize = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "CANCELLED")]
    #[strum(serialize = "CANCELLED")]
    Cancelled,
}

impl TransferStatus {
    /// COMPLETED and CANCELLED permit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether a reservation is currently held at the source location.
    pub fn holds_reservation(&self) -> bool {
        matches!(self, Self::Draft | Self::Approved | Self::InTransit)
    }

    pub fn can_approve(&self) -> bool {
        matches!(self, Self::Draft)
    }

    pub fn can_mark_in_transit(&self) -> bool {
        matches!(self, Self::Approved)
    }

    pub fn can_complete(&self) -> bool {
        matches!(self, Self::Approved | Self::InTransit)
    }

    pub fn can_cancel(&self) -> bool {
        !matches!(self, Self::Completed | Self::Cancelled)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transfer_line::Entity")]
    TransferLine,
}

impl Related<super::transfer_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransferLine.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use strum::IntoEnumIterator;

    #[test]
    fn draft_holds_reservation_and_can_only_approve_or_cancel() {
        let s = TransferStatus::Draft;
        assert!(s.holds_reservation());
        assert!(s.can_approve());
        assert!(s.can_cancel());
        assert!(!s.can_complete());
        assert!(!s.can_mark_in_transit());
    }

    #[test]
    fn completion_allowed_from_approved_and_in_transit_only() {
        for s in TransferStatus::iter() {
            assert_eq!(
                s.can_complete(),
                matches!(s, TransferStatus::Approved | TransferStatus::InTransit)
            );
        }
    }

    fn any_status() -> impl Strategy<Value = TransferStatus> {
        prop::sample::select(TransferStatus::iter().collect::<Vec<_>>())
    }

    proptest! {
        #[test]
        fn terminal_states_accept_no_operation(s in any_status()) {
            if s.is_terminal() {
                prop_assert!(!s.can_approve());
                prop_assert!(!s.can_mark_in_transit());
                prop_assert!(!s.can_complete());
                prop_assert!(!s.can_cancel());
            }
        }

        #[test]
        fn reservation_is_held_exactly_outside_terminal_states(s in any_status()) {
            prop_assert_eq!(s.holds_reservation(), !s.is_terminal());
        }
    }
}
