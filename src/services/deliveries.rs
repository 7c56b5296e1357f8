use crate::{
    entities::{
        delivery::{self, DeliveryStatus},
        order::OrderStatus,
        Delivery, DeliveryModel, Order,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Attaches delivery details to pending orders and advances their status.
#[derive(Clone)]
pub struct DeliveryService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl DeliveryService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Attaches delivery details to the caller's pending order.
    ///
    /// Exactly one delivery may exist per order; a second attach is a
    /// `Conflict` rather than a silent duplicate.
    #[instrument(skip(self, input))]
    pub async fn create_delivery(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        input: CreateDeliveryInput,
    ) -> Result<DeliveryModel, ServiceError> {
        if input.address.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "address must not be empty".to_string(),
            ));
        }

        let order = Order::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .filter(|o| o.user_id == user_id && o.status == OrderStatus::Pending)
            .ok_or_else(|| {
                ServiceError::NotFound("Order not found or already completed".to_string())
            })?;

        let existing = Delivery::find()
            .filter(delivery::Column::OrderId.eq(order.id))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "A delivery is already attached to this order".to_string(),
            ));
        }

        let now = Utc::now();
        let created = delivery::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            address: Set(input.address),
            pickup_branch: Set(input.pickup_branch),
            status: Set(DeliveryStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        self.event_sender
            .send_or_log(Event::DeliveryCreated {
                order_id: order.id,
                delivery_id: created.id,
            })
            .await;

        info!("Delivery {} attached to order {}", created.id, order.id);
        Ok(created)
    }

    /// Admin status update, validated against the delivery status track.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        delivery_id: Uuid,
        new_status: DeliveryStatus,
    ) -> Result<DeliveryModel, ServiceError> {
        let delivery = Delivery::find_by_id(delivery_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Delivery {} not found", delivery_id))
            })?;

        let old_status = delivery.status;
        if !old_status.can_transition(new_status) {
            return Err(ServiceError::ValidationError(format!(
                "Cannot transition delivery status from '{}' to '{}'",
                old_status, new_status
            )));
        }

        let mut active: delivery::ActiveModel = delivery.into();
        active.status = Set(new_status);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::DeliveryStatusChanged {
                delivery_id,
                old_status: old_status.to_string(),
                new_status: new_status.to_string(),
            })
            .await;

        info!(
            "Delivery {} status updated from '{}' to '{}'",
            delivery_id, old_status, new_status
        );
        Ok(updated)
    }
}

/// Input for attaching a delivery to an order
#[derive(Debug, Deserialize)]
pub struct CreateDeliveryInput {
    pub address: String,
    pub pickup_branch: Option<String>,
}
