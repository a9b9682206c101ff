//! Product catalog service tests.

mod common;

use rust_decimal::Decimal;

use storefront_core::domain::ProductFilter;
use storefront_core::errors::{AppError, ErrorKind};
use storefront_core::services::ServiceContainer;

#[tokio::test]
async fn test_create_get_update_delete() {
    let db = common::database().await;
    let services = common::services(db);
    let catalog = services.products();

    let created = catalog
        .create(common::product("Blue Shirt", "SH-BLUE", Decimal::new(1999, 2), 5, Some("shirts")))
        .await
        .unwrap();
    assert_eq!(created.price, Decimal::new(1999, 2));
    assert_eq!(catalog.get(created.id).await.unwrap().sku, "SH-BLUE");

    let updated = catalog
        .update(
            created.id,
            common::product("Blue Shirt XL", "SH-BLUE", Decimal::new(2199, 2), 7, Some("shirts")),
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Blue Shirt XL");
    assert_eq!(updated.stock, 7);

    catalog.delete(created.id).await.unwrap();
    assert!(matches!(catalog.get(created.id).await, Err(AppError::NotFound(_))));
    assert!(matches!(catalog.delete(created.id).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_create_rejects_invalid_and_duplicate_products() {
    let db = common::database().await;
    let services = common::services(db);
    let catalog = services.products();

    let free = catalog
        .create(common::product("Free", "FREE-1", Decimal::ZERO, 1, None))
        .await
        .unwrap_err();
    assert_eq!(free.kind(), ErrorKind::ValidationFailure);

    catalog
        .create(common::product("Mug", "MUG-1", Decimal::new(800, 2), 1, None))
        .await
        .unwrap();
    let duplicate = catalog
        .create(common::product("Other Mug", "MUG-1", Decimal::new(900, 2), 1, None))
        .await
        .unwrap_err();
    assert_eq!(duplicate.kind(), ErrorKind::Conflict);

    assert_eq!(catalog.list(&ProductFilter::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_missing_product_is_not_found() {
    let db = common::database().await;
    let services = common::services(db);

    let err = services
        .products()
        .update(77, common::product("Ghost", "GH-1", Decimal::ONE, 1, None))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
