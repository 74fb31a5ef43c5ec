//! In-memory ledger store.
//!
//! Backs tests and `serve --in-memory`. Transactional units hold a per-user
//! async mutex for their whole lifetime and stage their writes, which are
//! applied together on commit.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

use super::ledger::{LedgerStore, LedgerTransaction};
use crate::domain::{project_accounts, AccountSummary, Balance, SortOrder, User};
use crate::errors::{AppError, AppResult};

#[derive(Debug, Default)]
struct LedgerState {
    /// Registration order doubles as store-native listing order.
    users: Vec<User>,
    balances: HashMap<Uuid, Balance>,
}

impl LedgerState {
    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }
}

/// Ledger kept entirely in process memory.
#[derive(Default)]
pub struct MemoryLedger {
    state: Arc<RwLock<LedgerState>>,
    user_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-user unit lock. Entries nobody holds are pruned on the way in.
    async fn lock_for(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.entry(user_id).or_default().clone()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.state.read().await.user(id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, username: String, password_hash: String) -> AppResult<User> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.username == username) {
            return Err(AppError::conflict("User"));
        }

        let user = User::new(Uuid::new_v4(), username, password_hash);
        state.users.push(user.clone());
        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.state.write().await;
        let before = state.users.len();
        state.users.retain(|u| u.id != id);
        if state.users.len() == before {
            return Err(AppError::TargetUserNotFound);
        }
        state.balances.remove(&id);
        Ok(())
    }

    async fn find_balance(&self, user_id: Uuid) -> AppResult<Option<Balance>> {
        Ok(self.state.read().await.balances.get(&user_id).cloned())
    }

    async fn list_accounts(&self, order: SortOrder) -> AppResult<Vec<AccountSummary>> {
        let state = self.state.read().await;
        Ok(project_accounts(&state.users, &state.balances, order))
    }

    async fn begin(&self, user_id: Uuid) -> AppResult<Box<dyn LedgerTransaction>> {
        let guard = self.lock_for(user_id).await.lock_owned().await;

        let (user, balance) = {
            let state = self.state.read().await;
            (
                state.user(user_id).cloned(),
                state.balances.get(&user_id).cloned(),
            )
        };

        Ok(Box::new(MemoryTransaction {
            _guard: guard,
            state: self.state.clone(),
            user,
            balance,
            balance_is_new: false,
            staged_balance: None,
            staged_user: None,
        }))
    }
}

/// Unit of work over the in-memory ledger
struct MemoryTransaction {
    _guard: OwnedMutexGuard<()>,
    state: Arc<RwLock<LedgerState>>,
    user: Option<User>,
    balance: Option<Balance>,
    balance_is_new: bool,
    staged_balance: Option<Balance>,
    staged_user: Option<User>,
}

#[async_trait]
impl LedgerTransaction for MemoryTransaction {
    fn user(&self) -> Option<&User> {
        self.staged_user.as_ref().or(self.user.as_ref())
    }

    async fn balance(&mut self) -> AppResult<Option<Balance>> {
        Ok(self.staged_balance.clone().or_else(|| self.balance.clone()))
    }

    async fn create_balance(&mut self, balance: &Balance) -> AppResult<()> {
        if self.balance.is_some() || self.staged_balance.is_some() {
            return Err(AppError::conflict("Balance"));
        }
        self.balance_is_new = true;
        self.staged_balance = Some(balance.clone());
        Ok(())
    }

    async fn save_balance(&mut self, balance: &Balance) -> AppResult<()> {
        if self.balance.is_none() && self.staged_balance.is_none() {
            return Err(AppError::BalanceNotFound);
        }
        self.staged_balance = Some(balance.clone());
        Ok(())
    }

    async fn save_user(&mut self, user: &User) -> AppResult<()> {
        if self.user.is_none() {
            return Err(AppError::ActingUserNotFound);
        }
        let mut user = user.clone();
        user.updated_at = Utc::now();
        self.staged_user = Some(user);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let this = *self;
        let mut state = this.state.write().await;

        // Validate everything before applying anything.
        if let Some(user) = &this.staged_user {
            if state.user(user.id).is_none() {
                return Err(AppError::ActingUserNotFound);
            }
        }
        if let Some(balance) = &this.staged_balance {
            if state.user(balance.user_id).is_none() {
                return Err(AppError::ActingUserNotFound);
            }
            if this.balance_is_new && state.balances.contains_key(&balance.user_id) {
                return Err(AppError::conflict("Balance"));
            }
        }

        if let Some(balance) = this.staged_balance {
            state.balances.insert(balance.user_id, balance);
        }
        if let Some(user) = this.staged_user {
            if let Some(slot) = state.users.iter_mut().find(|u| u.id == user.id) {
                *slot = user;
            }
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}
