use crate::{
    entities::{order::OrderStatus, rating, Order, Rating, RatingModel},
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

/// Records one-time ratings on delivered orders.
#[derive(Clone)]
pub struct RatingService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl RatingService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Rates the caller's delivered order.
    ///
    /// One rating per (order, user): a repeat is a `Conflict`.
    #[instrument(skip(self, input))]
    pub async fn rate_order(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        input: RateOrderInput,
    ) -> Result<RatingModel, ServiceError> {
        if !(1..=5).contains(&input.score) {
            return Err(ServiceError::ValidationError(
                "score must be between 1 and 5".to_string(),
            ));
        }

        let order = Order::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .filter(|o| o.user_id == user_id && o.status == OrderStatus::Delivered)
            .ok_or_else(|| {
                ServiceError::NotFound("Order not found or not delivered".to_string())
            })?;

        let existing = Rating::find()
            .filter(rating::Column::OrderId.eq(order.id))
            .filter(rating::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "This order has already been rated".to_string(),
            ));
        }

        let created = rating::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            user_id: Set(user_id),
            score: Set(input.score),
            comment: Set(input.comment),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        self.event_sender
            .send_or_log(Event::RatingCreated {
                order_id: order.id,
                rating_id: created.id,
                score: created.score,
            })
            .await;

        info!("Order {} rated {}/5", order.id, created.score);
        Ok(created)
    }
}

/// Input for rating a delivered order
#[derive(Debug, Deserialize)]
pub struct RateOrderInput {
    pub score: i32,
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_order_input_deserialization() {
        let json = r#"{"score": 5, "comment": "Impeccable"}"#;
        let input: RateOrderInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.score, 5);
        assert_eq!(input.comment.as_deref(), Some("Impeccable"));
    }

    #[test]
    fn score_bounds() {
        assert!((1..=5).contains(&1));
        assert!((1..=5).contains(&5));
        assert!(!(1..=5).contains(&0));
        assert!(!(1..=5).contains(&6));
    }
}
