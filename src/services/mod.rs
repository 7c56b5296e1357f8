pub mod cart;
pub mod catalog;
pub mod deliveries;
pub mod orders;
pub mod payments;
pub mod ratings;
pub mod users;

pub use cart::CartService;
pub use catalog::CatalogService;
pub use deliveries::DeliveryService;
pub use orders::OrderService;
pub use payments::PaymentService;
pub use ratings::RatingService;
pub use users::UserAdminService;
