//! Repository layer - Data access abstraction
//!
//! One repository per entity family, all bound to the transaction of the
//! Unit of Work that created them.

mod base;
pub(crate) mod entities;
mod order_item_repository;
mod order_repository;
mod product_repository;
mod role_repository;
mod user_repository;

pub use base::{CrudRepository, TxHandle};
pub use order_item_repository::{OrderItemRepository, OrderItemStore};
pub use order_repository::{OrderRepository, OrderStore};
pub use product_repository::{ProductRepository, ProductStore};
pub use role_repository::{RoleRepository, RoleStore};
pub use user_repository::{UserRepository, UserStore};
