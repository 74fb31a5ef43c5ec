//! Account listing projection: users left-joined with their balances.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Balance, User};
use crate::config::{SORT_TOKEN_ASC, SORT_TOKEN_DESC};

/// Requested ordering of the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Store-native order
    #[default]
    Unsorted,
    Ascending,
    Descending,
}

impl SortOrder {
    /// Parse a `sort_amount` query token.
    ///
    /// Unknown or missing tokens fall back to `Unsorted` rather than failing.
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some(SORT_TOKEN_ASC) => SortOrder::Ascending,
            Some(SORT_TOKEN_DESC) => SortOrder::Descending,
            _ => SortOrder::Unsorted,
        }
    }

    pub fn as_token(&self) -> Option<&'static str> {
        match self {
            SortOrder::Unsorted => None,
            SortOrder::Ascending => Some(SORT_TOKEN_ASC),
            SortOrder::Descending => Some(SORT_TOKEN_DESC),
        }
    }

    /// Sort summaries in place; stable, so ties keep store order.
    pub fn apply(&self, accounts: &mut [AccountSummary]) {
        match self {
            SortOrder::Unsorted => {}
            SortOrder::Ascending => accounts.sort_by(|a, b| a.amount.cmp(&b.amount)),
            SortOrder::Descending => accounts.sort_by(|a, b| b.amount.cmp(&a.amount)),
        }
    }
}

/// One row of the user listing
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AccountSummary {
    pub id: Uuid,
    #[schema(example = "alice")]
    pub username: String,
    /// Zero for users that never transacted
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 250000.0)]
    pub amount: Decimal,
}

/// Join users to balances, one row per user, then order.
pub fn project_accounts<'a>(
    users: impl IntoIterator<Item = &'a User>,
    balances: &HashMap<Uuid, Balance>,
    order: SortOrder,
) -> Vec<AccountSummary> {
    let mut accounts: Vec<AccountSummary> = users
        .into_iter()
        .map(|user| AccountSummary {
            id: user.id,
            username: user.username.clone(),
            amount: balances
                .get(&user.id)
                .map(|b| b.amount)
                .unwrap_or(Decimal::ZERO),
        })
        .collect();

    order.apply(&mut accounts);
    accounts
}
