//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. Each call opens its own Unit of Work.

mod auth_service;
pub mod container;
mod order_service;
mod product_service;
pub mod tokens;
mod user_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthService, AuthSettings, Authenticator, TokenPair};
pub use order_service::{OrderDesk, OrderService};
pub use product_service::{ProductCatalog, ProductService};
pub use tokens::{Claims, Clock, JwtSigner, SystemClock, TokenIdentity, TokenSigner};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use tokens::{MockClock, MockTokenSigner};
