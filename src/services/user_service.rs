//! User service - listing and tier-gated deletion.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{self, AccountSummary, DeletionReceipt, SortOrder};
use crate::errors::{AppError, AppResult};
use crate::infra::LedgerStore;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Every user with their balance amount
    async fn list_users(&self, order: SortOrder) -> AppResult<Vec<AccountSummary>>;

    /// Check whether `acting_id` may delete `target_id` without deleting.
    async fn authorize_deletion(&self, acting_id: Uuid, target_id: Uuid) -> AppResult<()>;

    /// Delete `target_id` on behalf of `acting_id` once authorized.
    async fn delete_user(&self, acting_id: Uuid, target_id: Uuid) -> AppResult<DeletionReceipt>;
}

/// Concrete implementation of UserService over a ledger store.
pub struct UserManager {
    store: Arc<dyn LedgerStore>,
}

impl UserManager {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn list_users(&self, order: SortOrder) -> AppResult<Vec<AccountSummary>> {
        self.store.list_accounts(order).await
    }

    async fn authorize_deletion(&self, acting_id: Uuid, target_id: Uuid) -> AppResult<()> {
        // Self-deletion is refused before any lookup.
        if acting_id == target_id {
            return Err(AppError::SelfDeletionForbidden);
        }

        let acting = self
            .store
            .find_user(acting_id)
            .await?
            .ok_or(AppError::ActingUserNotFound)?;
        let target = self
            .store
            .find_user(target_id)
            .await?
            .ok_or(AppError::TargetUserNotFound)?;

        domain::authorize_deletion(&acting, &target).inspect_err(|e| {
            tracing::warn!(
                acting_id = %acting_id,
                acting_level = acting.level,
                target_id = %target_id,
                target_level = target.level,
                "Deletion denied: {}",
                e
            );
        })
    }

    async fn delete_user(&self, acting_id: Uuid, target_id: Uuid) -> AppResult<DeletionReceipt> {
        self.authorize_deletion(acting_id, target_id).await?;
        self.store.delete_user(target_id).await?;

        tracing::info!(deleted_user_id = %target_id, by_user_id = %acting_id, "User deleted");

        Ok(DeletionReceipt {
            deleted_user_id: target_id,
            by_user_id: acting_id,
        })
    }
}
