pub mod admin;
pub mod cart;
pub mod catalog;
pub mod common;
pub mod deliveries;
pub mod orders;

use crate::events::EventSender;
use crate::services::{
    CartService, CatalogService, DeliveryService, OrderService, PaymentService, RatingService,
    UserAdminService,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub cart: Arc<CartService>,
    pub orders: Arc<OrderService>,
    pub deliveries: Arc<DeliveryService>,
    pub payments: Arc<PaymentService>,
    pub ratings: Arc<RatingService>,
    pub catalog: Arc<CatalogService>,
    pub users: Arc<UserAdminService>,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self {
            cart: Arc::new(CartService::new(db.clone(), event_sender.clone())),
            orders: Arc::new(OrderService::new(db.clone(), event_sender.clone())),
            deliveries: Arc::new(DeliveryService::new(db.clone(), event_sender.clone())),
            payments: Arc::new(PaymentService::new(db.clone(), event_sender.clone())),
            ratings: Arc::new(RatingService::new(db.clone(), event_sender.clone())),
            catalog: Arc::new(CatalogService::new(db.clone(), event_sender.clone())),
            users: Arc::new(UserAdminService::new(db, event_sender)),
        }
    }
}
