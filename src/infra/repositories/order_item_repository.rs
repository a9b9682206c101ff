//! Order item repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::base::{self, CrudRepository, TxHandle};
use super::entities::order_item;
use crate::domain::{NewOrderItem, OrderItem};
use crate::errors::AppResult;

const ENTITY: &str = "OrderItem";

#[async_trait]
pub trait OrderItemRepository: CrudRepository<Record = OrderItem, NewRecord = NewOrderItem> {
    async fn list_by_order(&self, order_id: i32) -> AppResult<Vec<OrderItem>>;
}

pub struct OrderItemStore {
    handle: TxHandle,
}

impl OrderItemStore {
    pub(crate) fn new(handle: TxHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl CrudRepository for OrderItemStore {
    type Record = OrderItem;
    type NewRecord = NewOrderItem;

    async fn get_all(&self) -> AppResult<Vec<OrderItem>> {
        base::find_all::<order_item::Entity, OrderItem>(&self.handle, ENTITY).await
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Option<OrderItem>> {
        base::find_by_id::<order_item::Entity, OrderItem>(&self.handle, ENTITY, id).await
    }

    async fn add(&self, record: NewOrderItem) -> AppResult<i32> {
        let txn = self.handle.txn()?;
        let now = Utc::now();
        let model = order_item::ActiveModel {
            order_id: Set(record.order_id),
            product_id: Set(record.product_id),
            quantity: Set(record.quantity),
            unit_price: Set(record.unit_price),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(txn.as_ref())
        .await
        .map_err(self.handle.err_for(ENTITY))?;

        Ok(model.id)
    }

    /// Only quantity and unit price are mutable
    async fn update(&self, record: &OrderItem) -> AppResult<()> {
        let txn = self.handle.txn()?;
        let result = order_item::Entity::update_many()
            .col_expr(order_item::Column::Quantity, Expr::value(record.quantity))
            .col_expr(order_item::Column::UnitPrice, Expr::value(record.unit_price))
            .col_expr(order_item::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(order_item::Column::Id.eq(record.id))
            .exec(txn.as_ref())
            .await
            .map_err(self.handle.err_for(ENTITY))?;

        base::ensure_updated(result.rows_affected, ENTITY)
    }

    async fn delete_by_id(&self, id: i32) -> AppResult<bool> {
        base::delete_by_id::<order_item::Entity>(&self.handle, ENTITY, id).await
    }
}

#[async_trait]
impl OrderItemRepository for OrderItemStore {
    async fn list_by_order(&self, order_id: i32) -> AppResult<Vec<OrderItem>> {
        let txn = self.handle.txn()?;
        let models = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::Id)
            .all(txn.as_ref())
            .await
            .map_err(self.handle.err_for(ENTITY))?;

        Ok(models.into_iter().map(OrderItem::from).collect())
    }
}
