//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Cache, Database, LedgerStore};
use crate::services::{AuthService, BalanceService, ServiceContainer, Services, UserService};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// Balance service
    pub balance_service: Arc<dyn BalanceService>,
    /// User service
    pub user_service: Arc<dyn UserService>,
    /// Redis cache; rate limiting is skipped without it
    pub cache: Option<Arc<Cache>>,
    /// Database handle; absent when serving from memory
    pub database: Option<Arc<Database>>,
}

impl AppState {
    /// Build state with every service wired to `store`.
    pub fn from_store(store: Arc<dyn LedgerStore>, config: Config) -> Self {
        Self::from_services(&Services::new(store, config))
    }

    /// Build state from a service container.
    pub fn from_services(services: &impl ServiceContainer) -> Self {
        Self {
            auth_service: services.auth(),
            balance_service: services.balances(),
            user_service: services.users(),
            cache: None,
            database: None,
        }
    }

    /// Attach a Redis cache, enabling rate limiting.
    pub fn with_cache(mut self, cache: Option<Cache>) -> Self {
        self.cache = cache.map(Arc::new);
        self
    }

    /// Attach the database so health checks can ping it.
    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(Arc::new(database));
        self
    }
}
