use crate::{
    entities::{
        order::{self, OrderStatus},
        order_item, Category, Order, OrderItem, OrderModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::orders::OrderDetail,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Cart management built on the one-pending-order-per-user model.
///
/// The pending order *is* the cart: the first add creates it, every mutation
/// recomputes its total from the line rows inside the same transaction, and
/// payment later flips it out of `pending`. Line prices are snapshotted from
/// the category at add time, so later catalog edits never change an order's
/// total behind its back.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Adds a category to the caller's cart, merging into an existing line.
    ///
    /// Finds or creates the caller's pending order, then either increments
    /// the (order, category) line or creates it with the category's current
    /// price as the unit-price snapshot. The order total is recomputed as the
    /// sum of all line subtotals before the transaction commits.
    ///
    /// # Errors
    ///
    /// * `ValidationError` - quantity below 1
    /// * `NotFound` - unknown category
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: Uuid,
        input: AddToCartInput,
    ) -> Result<OrderDetail, ServiceError> {
        if input.quantity < 1 {
            return Err(ServiceError::ValidationError(
                "quantity must be at least 1".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let category = Category::find_by_id(input.category_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Category {} not found", input.category_id))
            })?;

        let (order, order_created) = match self.find_pending_order(&txn, user_id).await? {
            Some(existing) => (existing, false),
            None => {
                let now = Utc::now();
                let created = order::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    status: Set(OrderStatus::Pending),
                    total_cents: Set(0),
                    version: Set(1),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&txn)
                .await?;
                (created, true)
            }
        };

        let existing_item = OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order.id))
            .filter(order_item::Column::CategoryId.eq(input.category_id))
            .one(&txn)
            .await?;

        if let Some(item) = existing_item {
            let quantity = item.quantity + input.quantity;
            let unit_price_cents = item.unit_price_cents;
            let mut item: order_item::ActiveModel = item.into();
            item.quantity = Set(quantity);
            item.subtotal_cents = Set(unit_price_cents * i64::from(quantity));
            item.updated_at = Set(Utc::now());
            item.update(&txn).await?;
        } else {
            let now = Utc::now();
            order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order.id),
                category_id: Set(Some(category.id)),
                category_name: Set(category.name.clone()),
                quantity: Set(input.quantity),
                unit_price_cents: Set(category.price_cents),
                subtotal_cents: Set(category.price_cents * i64::from(input.quantity)),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }

        let updated_order = self.recalculate_order_total(&txn, order.id).await?;
        txn.commit().await?;

        if order_created {
            self.event_sender
                .send_or_log(Event::OrderCreated(updated_order.id))
                .await;
        }
        self.event_sender
            .send_or_log(Event::CartItemAdded {
                order_id: updated_order.id,
                category_id: input.category_id,
            })
            .await;

        info!(
            "Added {} x{} to order {}",
            category.name, input.quantity, updated_order.id
        );
        self.load_detail(updated_order).await
    }

    /// Removes one line from the caller's cart and recomputes the total.
    ///
    /// The line must belong to a pending order owned by the caller; anything
    /// else reads as `NotFound`, so callers cannot probe other users' carts.
    /// Removing the last line leaves an empty pending order with total 0.
    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        user_id: Uuid,
        order_item_id: Uuid,
    ) -> Result<OrderDetail, ServiceError> {
        let txn = self.db.begin().await?;

        let item = OrderItem::find_by_id(order_item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Item not found in cart".to_string()))?;

        let order = Order::find_by_id(item.order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Item not found in cart".to_string()))?;

        if order.user_id != user_id || order.status != OrderStatus::Pending {
            return Err(ServiceError::NotFound("Item not found in cart".to_string()));
        }

        let order_id = order.id;
        item.delete(&txn).await?;

        let updated_order = self.recalculate_order_total(&txn, order_id).await?;
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartItemRemoved {
                order_id,
                order_item_id,
            })
            .await;

        info!("Removed item {} from order {}", order_item_id, order_id);
        self.load_detail(updated_order).await
    }

    /// Empties the caller's cart.
    ///
    /// Deletes every line of the pending order and zeroes its total. Returns
    /// `None` (still a success) when the caller has no pending order.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self, user_id: Uuid) -> Result<Option<OrderModel>, ServiceError> {
        let txn = self.db.begin().await?;

        let order = match self.find_pending_order(&txn, user_id).await? {
            Some(order) => order,
            None => return Ok(None),
        };

        OrderItem::delete_many()
            .filter(order_item::Column::OrderId.eq(order.id))
            .exec(&txn)
            .await?;

        let updated_order = self.recalculate_order_total(&txn, order.id).await?;
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartCleared(updated_order.id))
            .await;

        info!("Cleared cart for user {}", user_id);
        Ok(Some(updated_order))
    }

    /// The caller's pending order with its lines and delivery, if any.
    pub async fn get_cart(&self, user_id: Uuid) -> Result<Option<OrderDetail>, ServiceError> {
        match self.find_pending_order(&*self.db, user_id).await? {
            Some(order) => Ok(Some(self.load_detail(order).await?)),
            None => Ok(None),
        }
    }

    async fn find_pending_order(
        &self,
        conn: &impl ConnectionTrait,
        user_id: Uuid,
    ) -> Result<Option<OrderModel>, ServiceError> {
        Ok(Order::find()
            .filter(order::Column::UserId.eq(user_id))
            .filter(order::Column::Status.eq(OrderStatus::Pending))
            .one(conn)
            .await?)
    }

    /// Recomputes the order total from its line rows and bumps the version.
    async fn recalculate_order_total(
        &self,
        conn: &impl ConnectionTrait,
        order_id: Uuid,
    ) -> Result<OrderModel, ServiceError> {
        let items = OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .all(conn)
            .await?;

        let total_cents: i64 = items.iter().map(|item| item.subtotal_cents).sum();

        let order = Order::find_by_id(order_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let version = order.version;
        let mut order: order::ActiveModel = order.into();
        order.total_cents = Set(total_cents);
        order.version = Set(version + 1);
        order.updated_at = Set(Utc::now());

        Ok(order.update(conn).await?)
    }

    async fn load_detail(&self, order: OrderModel) -> Result<OrderDetail, ServiceError> {
        let items = order
            .find_related(OrderItem)
            .all(&*self.db)
            .await?;
        let delivery = order
            .find_related(crate::entities::Delivery)
            .one(&*self.db)
            .await?;

        Ok(OrderDetail {
            order,
            items,
            delivery,
        })
    }
}

/// Input for adding an item to the cart
#[derive(Debug, Deserialize)]
pub struct AddToCartInput {
    pub category_id: Uuid,
    pub quantity: i32,
}
