use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Shipping or pickup details for one order. `order_id` is unique: at most
/// one delivery exists per order. Its status track advances independently of
/// the order status once created.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deliveries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub order_id: Uuid,
    pub address: String,
    /// Branch name when the customer picks up in store instead
    #[sea_orm(nullable)]
    pub pickup_branch: Option<String>,
    pub status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Delivery status enumeration
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeliveryStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_transit")]
    InTransit,
    #[sea_orm(string_value = "delivered")]
    Delivered,
}

impl DeliveryStatus {
    pub fn can_transition(self, next: DeliveryStatus) -> bool {
        matches!(
            (self, next),
            (DeliveryStatus::Pending, DeliveryStatus::InTransit)
                | (DeliveryStatus::InTransit, DeliveryStatus::Delivered)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn transitions_follow_the_track() {
        assert!(DeliveryStatus::Pending.can_transition(DeliveryStatus::InTransit));
        assert!(DeliveryStatus::InTransit.can_transition(DeliveryStatus::Delivered));
        assert!(!DeliveryStatus::Pending.can_transition(DeliveryStatus::Delivered));
        assert!(!DeliveryStatus::Delivered.can_transition(DeliveryStatus::Pending));
        assert!(!DeliveryStatus::InTransit.can_transition(DeliveryStatus::Pending));
    }

    #[test]
    fn status_string_round_trip() {
        assert_eq!(DeliveryStatus::InTransit.to_string(), "in_transit");
        assert_eq!(
            DeliveryStatus::from_str("in_transit").unwrap(),
            DeliveryStatus::InTransit
        );
        assert!(DeliveryStatus::from_str("lost").is_err());
    }
}
