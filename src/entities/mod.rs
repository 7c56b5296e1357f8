pub mod category;
pub mod delivery;
pub mod order;
pub mod order_item;
pub mod payment;
pub mod rating;
pub mod user;

pub use category::{Entity as Category, Model as CategoryModel};
pub use delivery::{Entity as Delivery, Model as DeliveryModel};
pub use order::{Entity as Order, Model as OrderModel};
pub use order_item::{Entity as OrderItem, Model as OrderItemModel};
pub use payment::{Entity as Payment, Model as PaymentModel};
pub use rating::{Entity as Rating, Model as RatingModel};
pub use user::{Entity as User, Model as UserModel};
