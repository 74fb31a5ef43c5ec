//! Service Container - Centralized service access.
//!
//! Handlers depend on service traits; the container wires them to one
//! shared ledger store.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, BalanceManager, BalanceService, UserManager, UserService,
};
use crate::config::Config;
use crate::infra::LedgerStore;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get balance service
    fn balances(&self) -> Arc<dyn BalanceService>;

    /// Get user service
    fn users(&self) -> Arc<dyn UserService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    balance_service: Arc<dyn BalanceService>,
    user_service: Arc<dyn UserService>,
}

impl Services {
    /// Build every service over the given store
    pub fn new(store: Arc<dyn LedgerStore>, config: Config) -> Self {
        Self {
            auth_service: Arc::new(Authenticator::new(store.clone(), config)),
            balance_service: Arc::new(BalanceManager::new(store.clone())),
            user_service: Arc::new(UserManager::new(store)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn balances(&self) -> Arc<dyn BalanceService> {
        self.balance_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }
}
