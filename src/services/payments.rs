use crate::{
    entities::{
        delivery::{self, DeliveryStatus},
        order::{self, OrderStatus},
        payment::{self, PaymentStatus},
        Delivery, DeliveryModel, Order, OrderModel, Payment, PaymentModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Validates and records payments against pending orders.
///
/// A successful payment is one transaction: the payment row, the order's move
/// to `processed`, and the delivery's move to `in_transit` commit together or
/// not at all. Replaying a paid request fails naturally because the order is
/// no longer pending.
#[derive(Clone)]
pub struct PaymentService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl PaymentService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Processes a payment for the caller's pending order.
    ///
    /// # Errors
    ///
    /// * `NotFound` - order missing, not owned by the caller, or not pending
    /// * `InvalidOperation` - no delivery attached yet
    /// * `PaymentFailed` - submitted amount differs from the stored total
    #[instrument(skip(self, input), fields(order_id = %order_id))]
    pub async fn process_payment(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        input: PaymentInput,
    ) -> Result<PaymentOutcome, ServiceError> {
        let txn = self.db.begin().await?;

        let order = Order::find_by_id(order_id)
            .one(&txn)
            .await?
            .filter(|o| o.user_id == user_id && o.status == OrderStatus::Pending)
            .ok_or_else(|| {
                ServiceError::NotFound("Order not found or already completed".to_string())
            })?;

        let delivery = Delivery::find()
            .filter(delivery::Column::OrderId.eq(order.id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidOperation(
                    "Delivery details must be attached before payment".to_string(),
                )
            })?;

        if input.amount_cents != order.total_cents {
            return Err(ServiceError::PaymentFailed(format!(
                "Amount {} does not match the order total {}",
                input.amount_cents, order.total_cents
            )));
        }

        let now = Utc::now();
        let payment = payment::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            amount_cents: Set(input.amount_cents),
            card_last4: Set(card_last4(&input.card_number)),
            card_holder: Set(input.card_holder),
            payment_method: Set(input.payment_method),
            status: Set(PaymentStatus::Completed),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let order_version = order.version;
        let mut order_active: order::ActiveModel = order.into();
        order_active.status = Set(OrderStatus::Processed);
        order_active.version = Set(order_version + 1);
        order_active.updated_at = Set(now);
        let order = order_active.update(&txn).await?;

        let mut delivery_active: delivery::ActiveModel = delivery.into();
        delivery_active.status = Set(DeliveryStatus::InTransit);
        delivery_active.updated_at = Set(now);
        let delivery = delivery_active.update(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::PaymentRecorded {
                order_id: order.id,
                payment_id: payment.id,
                amount_cents: payment.amount_cents,
            })
            .await;
        self.event_sender
            .send_or_log(Event::OrderStatusChanged {
                order_id: order.id,
                old_status: OrderStatus::Pending.to_string(),
                new_status: OrderStatus::Processed.to_string(),
            })
            .await;

        info!(
            "Payment {} of {} recorded for order {}",
            payment.id, payment.amount_cents, order.id
        );
        Ok(PaymentOutcome {
            payment,
            order,
            delivery,
        })
    }

    /// Payments recorded against one order.
    pub async fn list_for_order(&self, order_id: Uuid) -> Result<Vec<PaymentModel>, ServiceError> {
        Ok(Payment::find()
            .filter(payment::Column::OrderId.eq(order_id))
            .all(&*self.db)
            .await?)
    }
}

/// Input for paying an order. The security code is verified by the card
/// network collaborator and never persisted.
#[derive(Debug, Deserialize)]
pub struct PaymentInput {
    pub amount_cents: i64,
    pub card_number: String,
    pub card_holder: String,
    pub security_code: String,
    pub payment_method: String,
}

/// The records touched by a successful payment
#[derive(Debug, Serialize)]
pub struct PaymentOutcome {
    pub payment: PaymentModel,
    pub order: OrderModel,
    pub delivery: DeliveryModel,
}

fn card_last4(number: &str) -> String {
    let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
    let start = digits.len().saturating_sub(4);
    digits[start..].to_string()
}
