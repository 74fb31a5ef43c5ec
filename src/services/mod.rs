//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and the ledger store to fulfill
//! application use cases. They receive the store as an injected
//! `Arc<dyn LedgerStore>`.

mod auth_service;
mod balance_service;
pub mod container;
mod user_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use balance_service::{BalanceManager, BalanceService};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
