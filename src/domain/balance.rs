//! Balance entity and the credit/debit arithmetic.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::tier::Level;
use crate::errors::{AppError, AppResult};

/// Decimal places a stored amount keeps (`NUMERIC(20, 4)`).
pub const AMOUNT_SCALE: u32 = 4;

/// Whole units a stored amount must stay below in magnitude (`NUMERIC(20, 4)`).
pub const AMOUNT_LIMIT: i64 = 10_000_000_000_000_000;

/// Whether `amount` fits the stored column without rounding or overflow.
fn is_storable(amount: Decimal) -> bool {
    amount.normalize().scale() <= AMOUNT_SCALE && amount.abs() < Decimal::from(AMOUNT_LIMIT)
}

/// Check a credit or debit amount.
///
/// Must be positive and representable exactly in storage, so the level
/// is always derived from the amount that is actually persisted.
pub fn validate_amount(amount: Decimal) -> AppResult<Decimal> {
    if amount <= Decimal::ZERO || !is_storable(amount) {
        return Err(AppError::InvalidAmount);
    }
    Ok(amount.normalize())
}

/// A user's monetary balance. At most one per user.
///
/// `amount` may go negative through debits; no floor is enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Balance {
    pub user_id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 150000.0)]
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Balance {
    /// Balance created lazily by a user's first credit
    pub fn opening(user_id: Uuid, amount: Decimal) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            amount,
            created_at: now,
            updated_at: now,
        }
    }

    /// Add `amount`; fails with `InvalidAmount` if the result leaves the
    /// storable range.
    pub fn credit(&mut self, amount: Decimal) -> AppResult<()> {
        let next = self.amount.checked_add(amount).ok_or(AppError::InvalidAmount)?;
        self.set_amount(next)
    }

    /// Subtract `amount`; same range rule as `credit`.
    pub fn debit(&mut self, amount: Decimal) -> AppResult<()> {
        let next = self.amount.checked_sub(amount).ok_or(AppError::InvalidAmount)?;
        self.set_amount(next)
    }

    fn set_amount(&mut self, amount: Decimal) -> AppResult<()> {
        if !is_storable(amount) {
            return Err(AppError::InvalidAmount);
        }
        self.amount = amount;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Outcome of a credit or debit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct BalanceChange {
    /// Balance after the mutation
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 1500000.0)]
    pub new_balance: Decimal,
    /// Level after the mutation
    #[schema(example = 2)]
    pub level: Level,
}
