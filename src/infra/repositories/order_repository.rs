//! Order repository implementation.
//!
//! Orders are created through one atomic routine. On PostgreSQL that is the
//! `create_order(int, json)` function installed by migration; on other
//! backends the same steps run inside a savepoint of the enclosing
//! transaction. Either way a failure leaves no order or item rows behind.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction,
    DbBackend, DbErr, EntityTrait, QueryFilter, QueryOrder, Set, Statement, TransactionTrait,
};

use super::base::{self, CrudRepository, TxHandle};
use super::entities::{order, order_item, product};
use crate::domain::{
    order_total, NewOrder, Order, OrderDetails, OrderLine, OrderLineDetail, OrderSummary,
};
use crate::errors::{AppError, AppResult};

const ENTITY: &str = "Order";

/// Exception markers raised by the `create_order` routine
const PRODUCT_MISSING_MARKER: &str = "product_not_found";
const INSUFFICIENT_STOCK_MARKER: &str = "insufficient_stock";

#[async_trait]
pub trait OrderRepository: CrudRepository<Record = Order, NewRecord = NewOrder> {
    /// Create an order and all of its items in one atomic step.
    ///
    /// Validates products and stock, decrements stock, computes the total
    /// and returns the new order id.
    async fn create_order_atomic(&self, user_id: i32, lines: &[OrderLine]) -> AppResult<i32>;

    /// Fetch one order with its items and their product names
    async fn get_with_items(&self, order_id: i32) -> AppResult<Option<OrderDetails>>;

    /// List a user's orders without expanding items
    async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<OrderSummary>>;
}

pub struct OrderStore {
    handle: TxHandle,
}

impl OrderStore {
    pub(crate) fn new(handle: TxHandle) -> Self {
        Self { handle }
    }

    async fn call_routine(
        &self,
        savepoint: &DatabaseTransaction,
        user_id: i32,
        lines: &[OrderLine],
    ) -> AppResult<i32> {
        let items = serde_json::to_string(lines)
            .map_err(|e| AppError::internal(format!("Order items serialization failed: {}", e)))?;

        let row = savepoint
            .query_one(Statement::from_sql_and_values(
                DbBackend::Postgres,
                "SELECT create_order($1, $2::json) AS order_id",
                [user_id.into(), items.into()],
            ))
            .await
            .map_err(|e| self.routine_error(e))?
            .ok_or_else(|| AppError::internal("create_order returned no row"))?;

        row.try_get("", "order_id")
            .map_err(|e| self.handle.storage_error(ENTITY, e))
    }

    async fn run_steps(
        &self,
        savepoint: &DatabaseTransaction,
        user_id: i32,
        lines: &[OrderLine],
    ) -> AppResult<i32> {
        let now = Utc::now();

        for line in lines {
            let stocked = product::Entity::find_by_id(line.product_id)
                .one(savepoint)
                .await
                .map_err(self.handle.err_for("Product"))?
                .ok_or_else(|| {
                    tracing::warn!(
                        product_id = line.product_id,
                        "Order references unknown product"
                    );
                    AppError::not_found("Product")
                })?;

            let result = product::Entity::update_many()
                .col_expr(
                    product::Column::Stock,
                    Expr::col(product::Column::Stock).sub(line.quantity),
                )
                .col_expr(product::Column::UpdatedAt, Expr::value(now))
                .filter(product::Column::Id.eq(stocked.id))
                .filter(product::Column::Stock.gte(line.quantity))
                .exec(savepoint)
                .await
                .map_err(self.handle.err_for("Product"))?;

            if result.rows_affected == 0 {
                return Err(insufficient_stock(line.product_id));
            }
        }

        let created = order::ActiveModel {
            user_id: Set(user_id),
            total: Set(order_total(lines)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(savepoint)
        .await
        .map_err(self.handle.err_for(ENTITY))?;

        let items = lines.iter().map(|line| order_item::ActiveModel {
            order_id: Set(created.id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        });

        order_item::Entity::insert_many(items)
            .exec(savepoint)
            .await
            .map_err(self.handle.err_for("OrderItem"))?;

        Ok(created.id)
    }

    /// Map the routine's raised exceptions onto domain errors
    fn routine_error(&self, err: DbErr) -> AppError {
        let message = err.to_string();

        if let Some(product_id) = marked_product_id(&message, PRODUCT_MISSING_MARKER) {
            tracing::warn!(product_id, "Order references unknown product");
            return AppError::not_found("Product");
        }

        if let Some(product_id) = marked_product_id(&message, INSUFFICIENT_STOCK_MARKER) {
            return insufficient_stock(product_id);
        }

        self.handle.storage_error(ENTITY, err)
    }
}

fn insufficient_stock(product_id: i32) -> AppError {
    AppError::validation(
        "items",
        format!("Insufficient stock for product {}", product_id),
    )
}

/// Extract the product id following `marker: ` in a routine error message
fn marked_product_id(message: &str, marker: &str) -> Option<i32> {
    let rest = &message[message.find(marker)? + marker.len()..];
    let digits: String = rest
        .trim_start_matches([':', ' '])
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

#[async_trait]
impl CrudRepository for OrderStore {
    type Record = Order;
    type NewRecord = NewOrder;

    async fn get_all(&self) -> AppResult<Vec<Order>> {
        base::find_all::<order::Entity, Order>(&self.handle, ENTITY).await
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Option<Order>> {
        base::find_by_id::<order::Entity, Order>(&self.handle, ENTITY, id).await
    }

    async fn add(&self, record: NewOrder) -> AppResult<i32> {
        let txn = self.handle.txn()?;
        let now = Utc::now();
        let model = order::ActiveModel {
            user_id: Set(record.user_id),
            total: Set(record.total),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(txn.as_ref())
        .await
        .map_err(self.handle.err_for(ENTITY))?;

        Ok(model.id)
    }

    async fn update(&self, record: &Order) -> AppResult<()> {
        let txn = self.handle.txn()?;
        let result = order::Entity::update_many()
            .col_expr(order::Column::Total, Expr::value(record.total))
            .col_expr(order::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(order::Column::Id.eq(record.id))
            .exec(txn.as_ref())
            .await
            .map_err(self.handle.err_for(ENTITY))?;

        base::ensure_updated(result.rows_affected, ENTITY)
    }

    async fn delete_by_id(&self, id: i32) -> AppResult<bool> {
        base::delete_by_id::<order::Entity>(&self.handle, ENTITY, id).await
    }
}

#[async_trait]
impl OrderRepository for OrderStore {
    async fn create_order_atomic(&self, user_id: i32, lines: &[OrderLine]) -> AppResult<i32> {
        if lines.is_empty() {
            return Err(AppError::validation("items", "Order must contain at least one item"));
        }

        let txn = self.handle.txn()?;
        let savepoint = txn.begin().await.map_err(self.handle.err_for(ENTITY))?;

        let outcome = if savepoint.get_database_backend() == DbBackend::Postgres {
            self.call_routine(&savepoint, user_id, lines).await
        } else {
            self.run_steps(&savepoint, user_id, lines).await
        };

        match outcome {
            Ok(order_id) => {
                savepoint
                    .commit()
                    .await
                    .map_err(self.handle.err_for(ENTITY))?;
                tracing::info!(order_id, user_id, items = lines.len(), "Order created");
                Ok(order_id)
            }
            Err(e) => {
                if let Err(rollback_err) = savepoint.rollback().await {
                    tracing::error!("Order savepoint rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    async fn get_with_items(&self, order_id: i32) -> AppResult<Option<OrderDetails>> {
        let txn = self.handle.txn()?;

        let Some(order) = order::Entity::find_by_id(order_id)
            .one(txn.as_ref())
            .await
            .map_err(self.handle.err_for(ENTITY))?
        else {
            return Ok(None);
        };

        let rows = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .find_also_related(product::Entity)
            .order_by_asc(order_item::Column::Id)
            .all(txn.as_ref())
            .await
            .map_err(self.handle.err_for("OrderItem"))?;

        let items = rows
            .into_iter()
            .filter_map(|(item, product)| {
                product.map(|product| OrderLineDetail {
                    id: item.id,
                    product_id: item.product_id,
                    product_name: product.name,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                })
            })
            .collect();

        Ok(Some(OrderDetails {
            order: Order::from(order),
            items,
        }))
    }

    async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<OrderSummary>> {
        let txn = self.handle.txn()?;
        let models = order::Entity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_asc(order::Column::Id)
            .all(txn.as_ref())
            .await
            .map_err(self.handle.err_for(ENTITY))?;

        Ok(models
            .into_iter()
            .map(|m| OrderSummary::from(Order::from(m)))
            .collect())
    }
}
