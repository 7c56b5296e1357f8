use crate::{
    entities::{order, user, Order, OrderModel, User, UserModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Admin-side user administration.
#[derive(Clone)]
pub struct UserAdminService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

/// A user together with their orders
#[derive(Debug, Serialize)]
pub struct UserWithOrders {
    pub user: UserModel,
    pub orders: Vec<OrderModel>,
}

impl UserAdminService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    pub async fn list_users(&self) -> Result<Vec<UserModel>, ServiceError> {
        Ok(User::find()
            .order_by_asc(user::Column::Name)
            .all(&*self.db)
            .await?)
    }

    pub async fn get_user_with_orders(
        &self,
        user_id: Uuid,
    ) -> Result<UserWithOrders, ServiceError> {
        let user = User::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))?;

        let orders = Order::find()
            .filter(order::Column::UserId.eq(user.id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        Ok(UserWithOrders { user, orders })
    }

    /// Deletes a user. Their orders, and through them lines, deliveries,
    /// payments, and ratings, go with them via the FK cascade chain.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, user_id: Uuid) -> Result<(), ServiceError> {
        let user = User::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))?;

        user.delete(&*self.db).await?;

        self.event_sender.send_or_log(Event::UserDeleted(user_id)).await;

        info!("User {} deleted", user_id);
        Ok(())
    }
}
