//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use storefront_core::config::Config;
use storefront_core::domain::{Argon2Hasher, NewProduct, RegisterUser};
use storefront_core::infra::{CrudRepository, Migrator, Persistence};
use storefront_core::services::{Clock, JwtSigner, ServiceContainer, Services, SystemClock};

pub const JWT_KEY: &str = "integration-test-signing-key-0123456789";
pub const PASSWORD: &str = "s3cret-pass";

/// Fresh in-memory database with the schema applied.
///
/// One connection only: every connection to `sqlite::memory:` is a separate
/// database, so at most one Unit of Work may be open at a time.
pub async fn database() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.expect("connect sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub fn config() -> Config {
    Config::new("sqlite::memory:", JWT_KEY, "storefront", "storefront-clients", 15)
        .expect("valid config")
}

pub fn signer() -> JwtSigner {
    JwtSigner::from_config(&config())
}

/// Clock the test can move
#[derive(Clone)]
pub struct ManualClock(Arc<Mutex<DateTime<Utc>>>);

impl ManualClock {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(Utc.with_ymd_and_hms(2030, 6, 1, 9, 0, 0).unwrap())))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

pub fn services_with_clock(db: DatabaseConnection, clock: Arc<dyn Clock>) -> Services {
    let config = config();
    Services::with_collaborators(
        db,
        &config,
        Arc::new(Argon2Hasher::new()),
        Arc::new(JwtSigner::from_config(&config)),
        clock,
    )
    .expect("services")
}

pub fn services(db: DatabaseConnection) -> Services {
    services_with_clock(db, Arc::new(SystemClock))
}

pub async fn register(services: &Services, username: &str) -> i32 {
    services
        .users()
        .register(RegisterUser {
            username: username.to_string(),
            password: PASSWORD.to_string(),
            role_id: None,
        })
        .await
        .expect("register user")
}

pub fn product(
    name: &str,
    sku: &str,
    price: Decimal,
    stock: i32,
    category: Option<&str>,
) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        sku: sku.to_string(),
        price,
        stock,
        category: category.map(str::to_string),
    }
}

/// Insert products in one committed Unit of Work, returning their ids
pub async fn seed_products(db: &DatabaseConnection, products: Vec<NewProduct>) -> Vec<i32> {
    let persistence = Persistence::new(db.clone());
    let mut uow = persistence.begin().await.expect("begin");
    let repo = uow.products().expect("products");

    let mut ids = Vec::new();
    for product in products {
        ids.push(repo.add(product).await.expect("add product"));
    }
    uow.save().await.expect("save");
    ids
}

/// Read a product's stock through a throwaway Unit of Work
pub async fn product_stock(db: &DatabaseConnection, id: i32) -> i32 {
    let persistence = Persistence::new(db.clone());
    let mut uow = persistence.begin().await.expect("begin");
    let stock = uow
        .products()
        .expect("products")
        .get_by_id(id)
        .await
        .expect("get product")
        .expect("product exists")
        .stock;
    uow.dispose().await;
    stock
}
