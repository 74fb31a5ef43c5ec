//! Per-user unit of work on a database transaction.
//!
//! `begin` opens a transaction and takes a row lock on the user
//! (`SELECT ... FOR UPDATE`), so concurrent balance mutations for the same
//! user queue up behind each other instead of racing on a stale read.
//! Balance and level writes commit together or not at all; a unit dropped
//! before `commit` is rolled back by SeaORM.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, ActiveModelTrait, ActiveValue::Unchanged, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IsolationLevel, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use super::ledger::LedgerTransaction;
use super::repositories::entities::{
    balance::{ActiveModel as BalanceActiveModel, Entity as BalanceEntity},
    user::{ActiveModel as UserActiveModel, Entity as UserEntity},
};
use crate::domain::{Balance, User};
use crate::errors::{AppError, AppResult};

/// Transaction-scoped access to one user's records
pub struct SeaLedgerTransaction {
    txn: DatabaseTransaction,
    user_id: Uuid,
    user: Option<User>,
}

impl SeaLedgerTransaction {
    /// Begin a transaction and lock the user's row.
    ///
    /// ReadCommitted suffices: the row lock serializes writers for this user.
    pub async fn begin(db: &DatabaseConnection, user_id: Uuid) -> AppResult<Self> {
        let txn = db
            .begin_with_config(
                Some(IsolationLevel::ReadCommitted),
                Some(AccessMode::ReadWrite),
            )
            .await?;

        let user = UserEntity::find_by_id(user_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .map(User::from);

        Ok(Self { txn, user_id, user })
    }
}

#[async_trait]
impl LedgerTransaction for SeaLedgerTransaction {
    fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    async fn balance(&mut self) -> AppResult<Option<Balance>> {
        let result = BalanceEntity::find_by_id(self.user_id)
            .one(&self.txn)
            .await?;

        Ok(result.map(Balance::from))
    }

    async fn create_balance(&mut self, balance: &Balance) -> AppResult<()> {
        let active_model = BalanceActiveModel {
            user_id: Set(balance.user_id),
            amount: Set(balance.amount),
            created_at: Set(balance.created_at),
            updated_at: Set(balance.updated_at),
        };

        active_model.insert(&self.txn).await?;
        Ok(())
    }

    async fn save_balance(&mut self, balance: &Balance) -> AppResult<()> {
        let active_model = BalanceActiveModel {
            user_id: Unchanged(balance.user_id),
            amount: Set(balance.amount),
            updated_at: Set(balance.updated_at),
            ..Default::default()
        };

        active_model.update(&self.txn).await?;
        Ok(())
    }

    async fn save_user(&mut self, user: &User) -> AppResult<()> {
        if user.id != self.user_id {
            return Err(AppError::internal("unit of work is scoped to another user"));
        }

        let active_model = UserActiveModel {
            id: Unchanged(user.id),
            level: Set(user.level),
            updated_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let model = active_model.update(&self.txn).await?;
        self.user = Some(User::from(model));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.txn.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.txn.rollback().await?;
        Ok(())
    }
}
