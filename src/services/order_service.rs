//! Order service - Placing and reading orders.

use async_trait::async_trait;
use validator::Validate;

use crate::domain::{OrderDetails, OrderLine, OrderSummary};
use crate::errors::{AppError, AppResult};
use crate::infra::repositories::{CrudRepository, OrderRepository};
use crate::infra::Persistence;

#[async_trait]
pub trait OrderService: Send + Sync {
    /// Place an order for a user and return its id
    async fn place_order(&self, user_id: i32, lines: Vec<OrderLine>) -> AppResult<i32>;

    /// Fetch one of the user's orders with its items
    async fn get_order(&self, user_id: i32, order_id: i32) -> AppResult<OrderDetails>;

    /// List the user's orders, totals only
    async fn list_orders(&self, user_id: i32) -> AppResult<Vec<OrderSummary>>;
}

pub struct OrderDesk {
    persistence: Persistence,
}

impl OrderDesk {
    pub fn new(persistence: Persistence) -> Self {
        Self { persistence }
    }
}

#[async_trait]
impl OrderService for OrderDesk {
    async fn place_order(&self, user_id: i32, lines: Vec<OrderLine>) -> AppResult<i32> {
        if lines.is_empty() {
            return Err(AppError::validation("items", "Order must contain at least one item"));
        }
        for line in &lines {
            line.validate()?;
        }

        let mut uow = self.persistence.begin().await?;

        if uow.users()?.get_by_id(user_id).await?.is_none() {
            uow.dispose().await;
            return Err(AppError::not_found("User"));
        }

        let order_id = uow.orders()?.create_order_atomic(user_id, &lines).await?;
        uow.save().await?;

        Ok(order_id)
    }

    async fn get_order(&self, user_id: i32, order_id: i32) -> AppResult<OrderDetails> {
        let mut uow = self.persistence.begin().await?;
        let details = uow.orders()?.get_with_items(order_id).await?;
        uow.dispose().await;

        match details {
            Some(details) if details.order.user_id == user_id => Ok(details),
            Some(_) => {
                tracing::warn!(user_id, order_id, "Order requested by a different user");
                Err(AppError::not_found("Order"))
            }
            None => Err(AppError::not_found("Order")),
        }
    }

    async fn list_orders(&self, user_id: i32) -> AppResult<Vec<OrderSummary>> {
        let mut uow = self.persistence.begin().await?;
        let orders = uow.orders()?.list_by_user(user_id).await?;
        uow.dispose().await;
        Ok(orders)
    }
}
