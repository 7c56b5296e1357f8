use crate::{
    entities::{
        order::{self, OrderStatus},
        order_item, Delivery, DeliveryModel, Order, OrderItem, OrderModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// An order with its lines and delivery details, as returned to clients.
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    pub order: OrderModel,
    pub items: Vec<order_item::Model>,
    pub delivery: Option<DeliveryModel>,
}

/// Order reads and lifecycle transitions outside the cart/payment flows.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// The caller's order history, newest first, optionally filtered by
    /// exact status.
    pub async fn history_for_user(
        &self,
        user_id: Uuid,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderDetail>, ServiceError> {
        let mut query = Order::find().filter(order::Column::UserId.eq(user_id));
        if let Some(status) = status {
            query = query.filter(order::Column::Status.eq(status));
        }
        let orders = query
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        self.load_details(orders).await
    }

    /// Every user's orders, newest first. Admin-only at the HTTP layer.
    pub async fn list_all(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderDetail>, ServiceError> {
        let mut query = Order::find();
        if let Some(status) = status {
            query = query.filter(order::Column::Status.eq(status));
        }
        let orders = query
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        self.load_details(orders).await
    }

    /// Orders currently awaiting payment, newest first.
    pub async fn list_pending(&self) -> Result<Vec<OrderModel>, ServiceError> {
        Ok(Order::find()
            .filter(order::Column::Status.eq(OrderStatus::Pending))
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    pub async fn get_order_detail(&self, order_id: Uuid) -> Result<OrderDetail, ServiceError> {
        let order = Order::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let items = order.find_related(OrderItem).all(&*self.db).await?;
        let delivery = order.find_related(Delivery).one(&*self.db).await?;

        Ok(OrderDetail {
            order,
            items,
            delivery,
        })
    }

    /// Cancels the caller's pending order. Terminal; there is no un-cancel.
    #[instrument(skip(self))]
    pub async fn cancel_order(
        &self,
        user_id: Uuid,
        order_id: Uuid,
    ) -> Result<OrderModel, ServiceError> {
        let order = Order::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .filter(|o| o.user_id == user_id && o.status == OrderStatus::Pending)
            .ok_or_else(|| {
                ServiceError::NotFound("Order not found or cannot be cancelled".to_string())
            })?;

        let version = order.version;
        let mut active: order::ActiveModel = order.into();
        active.status = Set(OrderStatus::Cancelled);
        active.version = Set(version + 1);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::OrderCancelled(updated.id))
            .await;

        info!("Order {} cancelled", updated.id);
        Ok(updated)
    }

    /// Admin status update, validated against the lifecycle transition table.
    ///
    /// Rejects anything the table does not allow, including skipping
    /// `processed` on the way to `delivered`.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<OrderModel, ServiceError> {
        let txn = self.db.begin().await?;

        let order = Order::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let old_status = order.status;
        if !old_status.can_transition(new_status) {
            return Err(ServiceError::ValidationError(format!(
                "Cannot transition order status from '{}' to '{}'",
                old_status, new_status
            )));
        }

        let version = order.version;
        let mut active: order::ActiveModel = order.into();
        active.status = Set(new_status);
        active.version = Set(version + 1);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::OrderStatusChanged {
                order_id,
                old_status: old_status.to_string(),
                new_status: new_status.to_string(),
            })
            .await;

        info!(
            "Order {} status updated from '{}' to '{}'",
            order_id, old_status, new_status
        );
        Ok(updated)
    }

    async fn load_details(
        &self,
        orders: Vec<OrderModel>,
    ) -> Result<Vec<OrderDetail>, ServiceError> {
        let mut details = Vec::with_capacity(orders.len());
        for order in orders {
            let items = order.find_related(OrderItem).all(&*self.db).await?;
            let delivery = order.find_related(Delivery).one(&*self.db).await?;
            details.push(OrderDetail {
                order,
                items,
                delivery,
            });
        }
        Ok(details)
    }
}
