//! Domain layer - Core business entities
//!
//! Plain records for users, roles, products and orders, the write models
//! callers hand to the core, and the password-hashing collaborator.

pub mod order;
pub mod password;
pub mod product;
pub mod user;
mod validation;

pub use order::{
    order_total, NewOrder, NewOrderItem, Order, OrderDetails, OrderItem, OrderLine,
    OrderLineDetail, OrderSummary,
};
pub use password::{Argon2Hasher, CredentialHasher};
pub use product::{NewProduct, Product, ProductFilter};
pub use user::{NewRole, NewUser, RegisterUser, Role, User, UserWithRole};

#[cfg(any(test, feature = "test-utils"))]
pub use password::MockCredentialHasher;
