//! Product service - Catalog listing and maintenance.

use async_trait::async_trait;
use validator::Validate;

use crate::domain::{NewProduct, Product, ProductFilter};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::repositories::{CrudRepository, ProductRepository};
use crate::infra::Persistence;

#[async_trait]
pub trait ProductService: Send + Sync {
    /// List products matching the filter
    async fn list(&self, filter: &ProductFilter) -> AppResult<Vec<Product>>;

    async fn get(&self, id: i32) -> AppResult<Product>;

    /// Create a product. A duplicate SKU is a conflict.
    async fn create(&self, product: NewProduct) -> AppResult<Product>;

    /// Replace every field of an existing product
    async fn update(&self, id: i32, product: NewProduct) -> AppResult<Product>;

    async fn delete(&self, id: i32) -> AppResult<()>;
}

pub struct ProductCatalog {
    persistence: Persistence,
}

impl ProductCatalog {
    pub fn new(persistence: Persistence) -> Self {
        Self { persistence }
    }
}

#[async_trait]
impl ProductService for ProductCatalog {
    async fn list(&self, filter: &ProductFilter) -> AppResult<Vec<Product>> {
        let mut uow = self.persistence.begin().await?;
        let products = uow.products()?.list(filter).await?;
        uow.dispose().await;
        Ok(products)
    }

    async fn get(&self, id: i32) -> AppResult<Product> {
        let mut uow = self.persistence.begin().await?;
        let product = uow.products()?.get_by_id(id).await?;
        uow.dispose().await;
        product.ok_or_not_found("Product")
    }

    async fn create(&self, product: NewProduct) -> AppResult<Product> {
        product.validate()?;

        let mut uow = self.persistence.begin().await?;
        let products = uow.products()?;
        let id = products.add(product).await?;
        let created = products.get_by_id(id).await?.ok_or_not_found("Product")?;
        uow.save().await?;

        tracing::info!(product_id = id, sku = %created.sku, "Product created");
        Ok(created)
    }

    async fn update(&self, id: i32, product: NewProduct) -> AppResult<Product> {
        product.validate()?;

        let mut uow = self.persistence.begin().await?;
        let products = uow.products()?;
        let mut existing = products.get_by_id(id).await?.ok_or_not_found("Product")?;

        existing.name = product.name;
        existing.sku = product.sku;
        existing.price = product.price;
        existing.stock = product.stock;
        existing.category = product.category;

        products.update(&existing).await?;
        let updated = products.get_by_id(id).await?.ok_or_not_found("Product")?;
        uow.save().await?;

        Ok(updated)
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut uow = self.persistence.begin().await?;
        let deleted = uow.products()?.delete_by_id(id).await?;
        if !deleted {
            uow.dispose().await;
            return Err(AppError::not_found("Product"));
        }
        uow.save().await?;

        tracing::info!(product_id = id, "Product deleted");
        Ok(())
    }
}
