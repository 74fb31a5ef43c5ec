//! Balance service - credits, debits and the level that follows them.
//!
//! Every mutation runs inside one per-user transactional unit: the balance
//! write and the level write commit together or not at all.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{validate_amount, Balance, BalanceChange};
use crate::errors::{AppError, AppResult};
use crate::infra::{settle, LedgerStore, LedgerTransaction};

/// Balance service trait for dependency injection.
#[async_trait]
pub trait BalanceService: Send + Sync {
    /// Add `amount` to the user's balance, opening it on first use.
    async fn credit(&self, user_id: Uuid, amount: Decimal) -> AppResult<BalanceChange>;

    /// Subtract `amount` from an existing balance. No floor is enforced.
    async fn debit(&self, user_id: Uuid, amount: Decimal) -> AppResult<BalanceChange>;

    /// Current balance of the user
    async fn get_balance(&self, user_id: Uuid) -> AppResult<Balance>;
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Credit,
    Debit,
}

/// Concrete implementation of BalanceService over a ledger store.
pub struct BalanceManager {
    store: Arc<dyn LedgerStore>,
}

impl BalanceManager {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    async fn mutate(
        &self,
        user_id: Uuid,
        amount: Decimal,
        direction: Direction,
    ) -> AppResult<BalanceChange> {
        let amount = validate_amount(amount)?;

        let mut tx = self.store.begin(user_id).await?;
        let result = apply(tx.as_mut(), amount, direction).await;
        let change = settle(tx, result).await?;

        tracing::info!(
            user_id = %user_id,
            direction = ?direction,
            amount = %amount,
            new_balance = %change.new_balance,
            level = change.level,
            "Balance updated"
        );

        Ok(change)
    }
}

/// Read-modify-write of one user's balance and level inside `tx`.
async fn apply(
    tx: &mut dyn LedgerTransaction,
    amount: Decimal,
    direction: Direction,
) -> AppResult<BalanceChange> {
    let mut user = tx.user().cloned().ok_or(AppError::ActingUserNotFound)?;

    let balance = match (tx.balance().await?, direction) {
        (Some(mut balance), Direction::Credit) => {
            balance.credit(amount)?;
            tx.save_balance(&balance).await?;
            balance
        }
        (None, Direction::Credit) => {
            let balance = Balance::opening(user.id, amount);
            tx.create_balance(&balance).await?;
            balance
        }
        (Some(mut balance), Direction::Debit) => {
            balance.debit(amount)?;
            tx.save_balance(&balance).await?;
            balance
        }
        (None, Direction::Debit) => return Err(AppError::BalanceNotFound),
    };

    if user.sync_level(&balance) {
        tx.save_user(&user).await?;
    }

    Ok(BalanceChange {
        new_balance: balance.amount,
        level: user.level,
    })
}

#[async_trait]
impl BalanceService for BalanceManager {
    async fn credit(&self, user_id: Uuid, amount: Decimal) -> AppResult<BalanceChange> {
        self.mutate(user_id, amount, Direction::Credit).await
    }

    async fn debit(&self, user_id: Uuid, amount: Decimal) -> AppResult<BalanceChange> {
        self.mutate(user_id, amount, Direction::Debit).await
    }

    async fn get_balance(&self, user_id: Uuid) -> AppResult<Balance> {
        self.store
            .find_balance(user_id)
            .await?
            .ok_or(AppError::BalanceNotFound)
    }
}
