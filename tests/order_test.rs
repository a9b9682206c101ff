//! Order placement tests: atomic creation, stock handling and ownership.

mod common;

use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

use storefront_core::domain::OrderLine;
use storefront_core::errors::{AppError, ErrorKind};
use storefront_core::infra::{CrudRepository, OrderItemRepository, OrderRepository, Persistence};
use storefront_core::services::{ServiceContainer, Services};

struct Shop {
    db: DatabaseConnection,
    services: Services,
    buyer: i32,
    shirt: i32,
    socks: i32,
}

async fn shop() -> Shop {
    let db = common::database().await;
    let services = common::services(db.clone());
    let buyer = common::register(&services, "buyer").await;
    let ids = common::seed_products(
        &db,
        vec![
            common::product("Blue Shirt", "SH-BLUE", Decimal::new(1000, 2), 10, Some("shirts")),
            common::product("Wool Socks", "SK-WOOL", Decimal::new(500, 2), 3, Some("socks")),
        ],
    )
    .await;

    Shop {
        db,
        services,
        buyer,
        shirt: ids[0],
        socks: ids[1],
    }
}

/// Number of order and order item rows
async fn row_counts(db: &DatabaseConnection) -> (usize, usize) {
    let persistence = Persistence::new(db.clone());
    let mut uow = persistence.begin().await.unwrap();
    let orders = uow.orders().unwrap().get_all().await.unwrap().len();
    let items = uow.order_items().unwrap().get_all().await.unwrap().len();
    uow.dispose().await;
    (orders, items)
}

#[tokio::test]
async fn test_place_order_computes_total_and_items() {
    let shop = shop().await;

    let order_id = shop
        .services
        .orders()
        .place_order(
            shop.buyer,
            vec![
                OrderLine::new(shop.shirt, 2, Decimal::new(1000, 2)),
                OrderLine::new(shop.socks, 1, Decimal::new(500, 2)),
            ],
        )
        .await
        .unwrap();

    let details = shop.services.orders().get_order(shop.buyer, order_id).await.unwrap();
    assert_eq!(details.order.id, order_id);
    assert_eq!(details.order.total, Decimal::new(25, 0));
    assert_eq!(details.items.len(), 2);
    assert_eq!(details.items[0].product_name, "Blue Shirt");
    assert_eq!(details.items[0].quantity, 2);
    assert_eq!(details.items[1].product_name, "Wool Socks");
    assert_eq!(details.items[1].unit_price, Decimal::new(5, 0));

    assert_eq!(common::product_stock(&shop.db, shop.shirt).await, 8);
    assert_eq!(common::product_stock(&shop.db, shop.socks).await, 2);
}

#[tokio::test]
async fn test_missing_product_leaves_nothing_behind() {
    let shop = shop().await;

    let err = shop
        .services
        .orders()
        .place_order(
            shop.buyer,
            vec![
                OrderLine::new(shop.shirt, 1, Decimal::new(1000, 2)),
                OrderLine::new(9999, 1, Decimal::new(100, 2)),
            ],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(ref entity) if entity == "Product"));
    assert_eq!(row_counts(&shop.db).await, (0, 0));
    assert_eq!(common::product_stock(&shop.db, shop.shirt).await, 10);
}

#[tokio::test]
async fn test_insufficient_stock_is_rejected() {
    let shop = shop().await;

    let err = shop
        .services
        .orders()
        .place_order(
            shop.buyer,
            vec![
                OrderLine::new(shop.shirt, 1, Decimal::new(1000, 2)),
                OrderLine::new(shop.socks, 4, Decimal::new(500, 2)),
            ],
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ValidationFailure);
    assert_eq!(row_counts(&shop.db).await, (0, 0));
    assert_eq!(common::product_stock(&shop.db, shop.shirt).await, 10);
    assert_eq!(common::product_stock(&shop.db, shop.socks).await, 3);
}

#[tokio::test]
async fn test_order_input_is_validated() {
    let shop = shop().await;
    let orders = shop.services.orders();

    let empty = orders.place_order(shop.buyer, Vec::new()).await.unwrap_err();
    assert_eq!(empty.kind(), ErrorKind::ValidationFailure);

    let zero = orders
        .place_order(shop.buyer, vec![OrderLine::new(shop.shirt, 0, Decimal::new(1000, 2))])
        .await
        .unwrap_err();
    assert_eq!(zero.kind(), ErrorKind::ValidationFailure);

    let unknown_user = orders
        .place_order(9999, vec![OrderLine::new(shop.shirt, 1, Decimal::new(1000, 2))])
        .await
        .unwrap_err();
    assert!(matches!(unknown_user, AppError::NotFound(ref entity) if entity == "User"));

    assert_eq!(row_counts(&shop.db).await, (0, 0));
}

#[tokio::test]
async fn test_list_orders_returns_totals_only() {
    let shop = shop().await;
    let orders = shop.services.orders();

    let first = orders
        .place_order(shop.buyer, vec![OrderLine::new(shop.shirt, 1, Decimal::new(1000, 2))])
        .await
        .unwrap();
    let second = orders
        .place_order(shop.buyer, vec![OrderLine::new(shop.socks, 2, Decimal::new(500, 2))])
        .await
        .unwrap();

    let listed = orders.list_orders(shop.buyer).await.unwrap();
    let ids: Vec<_> = listed.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![first, second]);
    assert_eq!(listed[0].total, Decimal::new(10, 0));
    assert_eq!(listed[1].total, Decimal::new(10, 0));
    assert!(listed.iter().all(|o| o.user_id == shop.buyer));
}

#[tokio::test]
async fn test_other_users_order_is_not_found() {
    let shop = shop().await;
    let other = common::register(&shop.services, "other").await;

    let order_id = shop
        .services
        .orders()
        .place_order(shop.buyer, vec![OrderLine::new(shop.shirt, 1, Decimal::new(1000, 2))])
        .await
        .unwrap();

    let err = shop.services.orders().get_order(other, order_id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref entity) if entity == "Order"));
    assert!(shop.services.orders().list_orders(other).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_atomic_creation_inside_open_unit_of_work() {
    let shop = shop().await;
    let persistence = Persistence::new(shop.db.clone());

    let mut uow = persistence.begin().await.unwrap();
    let orders = uow.orders().unwrap();

    let failed = orders
        .create_order_atomic(shop.buyer, &[OrderLine::new(shop.socks, 10, Decimal::new(500, 2))])
        .await;
    assert!(failed.is_err());

    // The enclosing transaction is still usable after the failed attempt
    let order_id = orders
        .create_order_atomic(shop.buyer, &[OrderLine::new(shop.socks, 3, Decimal::new(500, 2))])
        .await
        .unwrap();
    let items = uow.order_items().unwrap().list_by_order(order_id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 3);
    uow.save().await.unwrap();

    assert_eq!(row_counts(&shop.db).await, (1, 1));
    assert_eq!(common::product_stock(&shop.db, shop.socks).await, 0);
}
