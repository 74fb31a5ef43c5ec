//! Ledger store capability consumed by the services.
//!
//! Services receive an `Arc<dyn LedgerStore>`; the PostgreSQL store and the
//! in-memory store both implement it.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{AccountSummary, Balance, SortOrder, User};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Durable storage for users and balances.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Find user by ID
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by username
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Insert a new user at the base level.
    ///
    /// Fails with `Conflict` if the username is taken.
    async fn create_user(&self, username: String, password_hash: String) -> AppResult<User>;

    /// Remove a user and their balance.
    async fn delete_user(&self, id: Uuid) -> AppResult<()>;

    /// Find the balance belonging to a user
    async fn find_balance(&self, user_id: Uuid) -> AppResult<Option<Balance>>;

    /// Every user with their balance amount (zero when absent)
    async fn list_accounts(&self, order: SortOrder) -> AppResult<Vec<AccountSummary>>;

    /// Open a transactional unit scoped to one user.
    ///
    /// Units for the same user are serialized: a second `begin` for that user
    /// waits until the first unit commits or rolls back.
    async fn begin(&self, user_id: Uuid) -> AppResult<Box<dyn LedgerTransaction>>;
}

/// Per-user transactional unit.
///
/// Writes become visible only on `commit`. Dropping the unit without
/// committing discards them.
#[async_trait]
pub trait LedgerTransaction: Send {
    /// The user this unit is scoped to, as read when the unit began
    fn user(&self) -> Option<&User>;

    async fn balance(&mut self) -> AppResult<Option<Balance>>;

    async fn create_balance(&mut self, balance: &Balance) -> AppResult<()>;

    async fn save_balance(&mut self, balance: &Balance) -> AppResult<()>;

    async fn save_user(&mut self, user: &User) -> AppResult<()>;

    async fn commit(self: Box<Self>) -> AppResult<()>;

    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

/// Commit on success, roll back on error.
///
/// A failed rollback is logged and the original error returned.
pub async fn settle<T>(tx: Box<dyn LedgerTransaction>, result: AppResult<T>) -> AppResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!("Transaction rollback failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}
