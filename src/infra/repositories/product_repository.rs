//! Product repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::{extension::postgres::PgExpr, Expr, LikeExpr},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbBackend, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use super::base::{self, CrudRepository, TxHandle};
use super::entities::product;
use crate::domain::{NewProduct, Product, ProductFilter};
use crate::errors::AppResult;

const ENTITY: &str = "Product";
const LIKE_ESCAPE: char = '\\';

#[async_trait]
pub trait ProductRepository: CrudRepository<Record = Product, NewRecord = NewProduct> {
    /// List products matching every filter that is set
    async fn list(&self, filter: &ProductFilter) -> AppResult<Vec<Product>>;

    async fn find_by_sku(&self, sku: &str) -> AppResult<Option<Product>>;
}

pub struct ProductStore {
    handle: TxHandle,
}

impl ProductStore {
    pub(crate) fn new(handle: TxHandle) -> Self {
        Self { handle }
    }
}

/// Substring pattern with LIKE wildcards in the input escaped
fn contains_pattern(input: &str) -> String {
    let mut pattern = String::with_capacity(input.len() + 2);
    pattern.push('%');
    for c in input.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl CrudRepository for ProductStore {
    type Record = Product;
    type NewRecord = NewProduct;

    async fn get_all(&self) -> AppResult<Vec<Product>> {
        base::find_all::<product::Entity, Product>(&self.handle, ENTITY).await
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Option<Product>> {
        base::find_by_id::<product::Entity, Product>(&self.handle, ENTITY, id).await
    }

    async fn add(&self, record: NewProduct) -> AppResult<i32> {
        let txn = self.handle.txn()?;
        let now = Utc::now();
        let model = product::ActiveModel {
            name: Set(record.name),
            sku: Set(record.sku),
            price: Set(record.price),
            stock: Set(record.stock),
            category: Set(record.category),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(txn.as_ref())
        .await
        .map_err(self.handle.err_for(ENTITY))?;

        Ok(model.id)
    }

    async fn update(&self, record: &Product) -> AppResult<()> {
        let txn = self.handle.txn()?;
        let result = product::Entity::update_many()
            .col_expr(product::Column::Name, Expr::value(record.name.clone()))
            .col_expr(product::Column::Sku, Expr::value(record.sku.clone()))
            .col_expr(product::Column::Price, Expr::value(record.price))
            .col_expr(product::Column::Stock, Expr::value(record.stock))
            .col_expr(product::Column::Category, Expr::value(record.category.clone()))
            .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(product::Column::Id.eq(record.id))
            .exec(txn.as_ref())
            .await
            .map_err(self.handle.err_for(ENTITY))?;

        base::ensure_updated(result.rows_affected, ENTITY)
    }

    async fn delete_by_id(&self, id: i32) -> AppResult<bool> {
        base::delete_by_id::<product::Entity>(&self.handle, ENTITY, id).await
    }
}

#[async_trait]
impl ProductRepository for ProductStore {
    async fn list(&self, filter: &ProductFilter) -> AppResult<Vec<Product>> {
        let txn = self.handle.txn()?;
        let mut query = product::Entity::find();

        if let Some(category) = filter.category() {
            query = query.filter(product::Column::Category.eq(category));
        }

        if let Some(name) = filter.name() {
            let pattern = LikeExpr::new(contains_pattern(name)).escape(LIKE_ESCAPE);
            let name_col = Expr::col(product::Column::Name);

            // ILIKE folds case by the database's locale; SQLite's LIKE folds ASCII only
            let matches = match txn.get_database_backend() {
                DbBackend::Postgres => name_col.ilike(pattern),
                _ => name_col.like(pattern),
            };
            query = query.filter(matches);
        }

        let models = query
            .order_by_asc(product::Column::Id)
            .all(txn.as_ref())
            .await
            .map_err(self.handle.err_for(ENTITY))?;

        Ok(models.into_iter().map(Product::from).collect())
    }

    async fn find_by_sku(&self, sku: &str) -> AppResult<Option<Product>> {
        let txn = self.handle.txn()?;
        let model = product::Entity::find()
            .filter(product::Column::Sku.eq(sku))
            .one(txn.as_ref())
            .await
            .map_err(self.handle.err_for(ENTITY))?;

        Ok(model.map(Product::from))
    }
}
