use crate::{
    entities::{category, Category, CategoryModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Catalog management: the admin-curated list of orderable laundry items.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    pub async fn list_categories(&self) -> Result<Vec<CategoryModel>, ServiceError> {
        Ok(Category::find()
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await?)
    }

    pub async fn get_category(&self, category_id: Uuid) -> Result<CategoryModel, ServiceError> {
        Category::find_by_id(category_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Category {} not found", category_id)))
    }

    #[instrument(skip(self, input))]
    pub async fn create_category(
        &self,
        input: CreateCategoryInput,
    ) -> Result<CategoryModel, ServiceError> {
        if input.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "name must not be empty".to_string(),
            ));
        }
        if input.price_cents < 0 {
            return Err(ServiceError::ValidationError(
                "price_cents must not be negative".to_string(),
            ));
        }

        let now = Utc::now();
        let created = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            price_cents: Set(input.price_cents),
            image: Set(input.image),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        self.event_sender
            .send_or_log(Event::CategoryCreated(created.id))
            .await;

        info!("Category '{}' created", created.name);
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update_price(
        &self,
        category_id: Uuid,
        price_cents: i64,
    ) -> Result<CategoryModel, ServiceError> {
        if price_cents < 0 {
            return Err(ServiceError::ValidationError(
                "price_cents must not be negative".to_string(),
            ));
        }

        let category = self.get_category(category_id).await?;
        let mut active: category::ActiveModel = category.into();
        active.price_cents = Set(price_cents);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CategoryUpdated(updated.id))
            .await;

        info!("Category {} price updated", updated.id);
        Ok(updated)
    }

    #[instrument(skip(self, image))]
    pub async fn update_image(
        &self,
        category_id: Uuid,
        image: String,
    ) -> Result<CategoryModel, ServiceError> {
        if image.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "image must not be empty".to_string(),
            ));
        }

        let category = self.get_category(category_id).await?;
        let mut active: category::ActiveModel = category.into();
        active.image = Set(image);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CategoryUpdated(updated.id))
            .await;

        info!("Category {} image updated", updated.id);
        Ok(updated)
    }

    /// Deletes a catalog entry. Historical order lines keep their snapshot;
    /// their `category_id` becomes NULL through the FK policy.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, category_id: Uuid) -> Result<(), ServiceError> {
        let category = self.get_category(category_id).await?;
        category.delete(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CategoryDeleted(category_id))
            .await;

        info!("Category {} deleted", category_id);
        Ok(())
    }
}

/// Input for creating a catalog category
#[derive(Debug, Deserialize)]
pub struct CreateCategoryInput {
    pub name: String,
    pub price_cents: i64,
    pub image: String,
}
