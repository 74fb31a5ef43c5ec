//! Balance service tests against the in-memory ledger.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use digi_wallet::domain::{AccountSummary, Balance, SortOrder, User, AMOUNT_LIMIT};
use digi_wallet::errors::{AppError, AppResult};
use digi_wallet::infra::{LedgerStore, LedgerTransaction, MemoryLedger};
use digi_wallet::services::{BalanceManager, BalanceService};

async fn setup() -> (Arc<MemoryLedger>, BalanceManager, User) {
    let store = Arc::new(MemoryLedger::new());
    let user = store
        .create_user("alice".to_string(), "hashed".to_string())
        .await
        .unwrap();
    let service = BalanceManager::new(store.clone());
    (store, service, user)
}

fn dec(value: i64) -> Decimal {
    Decimal::from(value)
}

#[tokio::test]
async fn test_first_credit_opens_balance() {
    let (store, service, user) = setup().await;
    assert!(store.find_balance(user.id).await.unwrap().is_none());

    let change = service.credit(user.id, dec(150_000)).await.unwrap();

    assert_eq!(change.new_balance, dec(150_000));
    assert_eq!(change.level, 1);
    assert_eq!(
        store.find_balance(user.id).await.unwrap().unwrap().amount,
        dec(150_000)
    );
}

#[tokio::test]
async fn test_credit_accumulates_and_promotes() {
    let (store, service, user) = setup().await;

    service.credit(user.id, dec(1_000_000)).await.unwrap();
    let change = service.credit(user.id, dec(1)).await.unwrap();

    assert_eq!(change.new_balance, dec(1_000_001));
    assert_eq!(change.level, 2);
    assert_eq!(store.find_user(user.id).await.unwrap().unwrap().level, 2);
}

#[tokio::test]
async fn test_credit_straight_to_top_tier() {
    let (_store, service, user) = setup().await;

    let change = service.credit(user.id, dec(3_000_001)).await.unwrap();
    assert_eq!(change.level, 4);
}

#[tokio::test]
async fn test_fractional_amounts() {
    let (_store, service, user) = setup().await;

    service.credit(user.id, Decimal::new(1050, 2)).await.unwrap();
    let change = service.debit(user.id, Decimal::new(25, 2)).await.unwrap();

    assert_eq!(change.new_balance, Decimal::new(1025, 2));
}

#[tokio::test]
async fn test_non_positive_credit_leaves_store_unchanged() {
    let (store, service, user) = setup().await;

    for amount in [dec(0), dec(-5)] {
        let result = service.credit(user.id, amount).await;
        assert!(matches!(result, Err(AppError::InvalidAmount)));
    }

    assert!(store.find_balance(user.id).await.unwrap().is_none());
    assert_eq!(store.find_user(user.id).await.unwrap().unwrap().level, 1);
}

#[tokio::test]
async fn test_non_positive_debit_rejected() {
    let (store, service, user) = setup().await;
    service.credit(user.id, dec(500)).await.unwrap();

    let result = service.debit(user.id, dec(-100)).await;

    assert!(matches!(result, Err(AppError::InvalidAmount)));
    assert_eq!(
        store.find_balance(user.id).await.unwrap().unwrap().amount,
        dec(500)
    );
}

#[tokio::test]
async fn test_debit_without_balance() {
    let (store, service, user) = setup().await;

    let result = service.debit(user.id, dec(10)).await;

    assert!(matches!(result, Err(AppError::BalanceNotFound)));
    assert!(store.find_balance(user.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_credit_then_debit_restores_balance_and_level() {
    let (store, service, user) = setup().await;
    service.credit(user.id, dec(100)).await.unwrap();

    let up = service.credit(user.id, dec(2_500_000)).await.unwrap();
    assert_eq!(up.level, 3);

    let down = service.debit(user.id, dec(2_500_000)).await.unwrap();
    assert_eq!(down.new_balance, dec(100));
    assert_eq!(down.level, 1);
    assert_eq!(store.find_user(user.id).await.unwrap().unwrap().level, 1);
}

#[tokio::test]
async fn test_debit_may_go_negative() {
    let (_store, service, user) = setup().await;
    service.credit(user.id, dec(50)).await.unwrap();

    let change = service.debit(user.id, dec(80)).await.unwrap();

    assert_eq!(change.new_balance, dec(-30));
    assert_eq!(change.level, 1);
}

#[tokio::test]
async fn test_unknown_user() {
    let (store, service, _user) = setup().await;
    let stranger = Uuid::new_v4();

    assert!(matches!(
        service.credit(stranger, dec(10)).await,
        Err(AppError::ActingUserNotFound)
    ));
    assert!(matches!(
        service.debit(stranger, dec(10)).await,
        Err(AppError::ActingUserNotFound)
    ));
    assert!(store.find_balance(stranger).await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_balance() {
    let (_store, service, user) = setup().await;
    assert!(matches!(
        service.get_balance(user.id).await,
        Err(AppError::BalanceNotFound)
    ));

    service.credit(user.id, dec(7)).await.unwrap();
    assert_eq!(service.get_balance(user.id).await.unwrap().amount, dec(7));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_credits_are_not_lost() {
    const CREDITS: i64 = 64;

    let (store, service, user) = setup().await;
    let service = Arc::new(service);
    let user_id = user.id;

    let handles: Vec<_> = (0..CREDITS)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.credit(user_id, dec(100)).await })
        })
        .collect();

    for handle in futures::future::join_all(handles).await {
        handle.unwrap().unwrap();
    }

    let balance = store.find_balance(user.id).await.unwrap().unwrap();
    assert_eq!(balance.amount, dec(100 * CREDITS));

    let stored = store.find_user(user.id).await.unwrap().unwrap();
    assert_eq!(stored.level, digi_wallet::domain::tier_for(balance.amount));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_credits_cross_threshold_consistently() {
    let (store, service, user) = setup().await;
    let service = Arc::new(service);
    let user_id = user.id;
    service.credit(user_id, dec(999_000)).await.unwrap();

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.credit(user_id, dec(100)).await })
        })
        .collect();

    for handle in futures::future::join_all(handles).await {
        handle.unwrap().unwrap();
    }

    // 999_000 + 2_000 crosses 1_000_000 exactly once
    let balance = store.find_balance(user.id).await.unwrap().unwrap();
    assert_eq!(balance.amount, dec(1_001_000));
    assert_eq!(store.find_user(user.id).await.unwrap().unwrap().level, 2);
}

// =============================================================================
// Amount range and precision
// =============================================================================

#[tokio::test]
async fn test_overflowing_credit_is_rejected() {
    let (store, service, user) = setup().await;
    service.credit(user.id, dec(500)).await.unwrap();

    let huge = Decimal::from_scientific("5e28").unwrap();
    for _ in 0..2 {
        let result = service.credit(user.id, huge).await;
        assert!(matches!(result, Err(AppError::InvalidAmount)));
    }

    assert_eq!(store.find_balance(user.id).await.unwrap().unwrap().amount, dec(500));
    assert_eq!(store.find_user(user.id).await.unwrap().unwrap().level, 1);
}

#[tokio::test]
async fn test_balance_cannot_leave_storable_range() {
    let (store, service, user) = setup().await;
    let near_limit = Decimal::from(AMOUNT_LIMIT) - Decimal::ONE;
    service.credit(user.id, near_limit).await.unwrap();

    let result = service.credit(user.id, dec(1)).await;
    assert!(matches!(result, Err(AppError::InvalidAmount)));
    assert_eq!(store.find_balance(user.id).await.unwrap().unwrap().amount, near_limit);

    // and the same in the negative direction
    let (store, service, user) = setup().await;
    service.credit(user.id, dec(1)).await.unwrap();
    service.debit(user.id, near_limit).await.unwrap();
    let result = service.debit(user.id, dec(2)).await;
    assert!(matches!(result, Err(AppError::InvalidAmount)));
    assert_eq!(
        store.find_balance(user.id).await.unwrap().unwrap().amount,
        dec(1) - near_limit
    );
}

#[tokio::test]
async fn test_sub_cent_precision_cannot_cross_threshold() {
    let (store, service, user) = setup().await;

    // 1_000_000.00004 would round to 1_000_000.0000 in storage
    let result = service.credit(user.id, Decimal::new(100_000_000_004, 5)).await;

    assert!(matches!(result, Err(AppError::InvalidAmount)));
    assert!(store.find_balance(user.id).await.unwrap().is_none());
    assert_eq!(store.find_user(user.id).await.unwrap().unwrap().level, 1);

    let change = service.credit(user.id, Decimal::new(10_000_000_001, 4)).await.unwrap();
    assert_eq!(change.level, 2);
}

// =============================================================================
// Partial failure
// =============================================================================

/// Delegates to a `MemoryLedger` but fails every level write.
struct LevelWriteFails {
    inner: Arc<MemoryLedger>,
}

struct FailingLevelWrite {
    inner: Box<dyn LedgerTransaction>,
}

#[async_trait]
impl LedgerStore for LevelWriteFails {
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        self.inner.find_user(id).await
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.inner.find_user_by_username(username).await
    }

    async fn create_user(&self, username: String, password_hash: String) -> AppResult<User> {
        self.inner.create_user(username, password_hash).await
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        self.inner.delete_user(id).await
    }

    async fn find_balance(&self, user_id: Uuid) -> AppResult<Option<Balance>> {
        self.inner.find_balance(user_id).await
    }

    async fn list_accounts(&self, order: SortOrder) -> AppResult<Vec<AccountSummary>> {
        self.inner.list_accounts(order).await
    }

    async fn begin(&self, user_id: Uuid) -> AppResult<Box<dyn LedgerTransaction>> {
        let inner = self.inner.begin(user_id).await?;
        Ok(Box::new(FailingLevelWrite { inner }))
    }
}

#[async_trait]
impl LedgerTransaction for FailingLevelWrite {
    fn user(&self) -> Option<&User> {
        self.inner.user()
    }

    async fn balance(&mut self) -> AppResult<Option<Balance>> {
        self.inner.balance().await
    }

    async fn create_balance(&mut self, balance: &Balance) -> AppResult<()> {
        self.inner.create_balance(balance).await
    }

    async fn save_balance(&mut self, balance: &Balance) -> AppResult<()> {
        self.inner.save_balance(balance).await
    }

    async fn save_user(&mut self, _user: &User) -> AppResult<()> {
        Err(sea_orm::DbErr::Custom("level write lost".to_string()).into())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.inner.rollback().await
    }
}

#[tokio::test]
async fn test_failed_level_write_rolls_back_balance() {
    let (store, service, user) = setup().await;
    service.credit(user.id, dec(500)).await.unwrap();

    let flaky = BalanceManager::new(Arc::new(LevelWriteFails { inner: store.clone() }));
    let err = flaky.credit(user.id, dec(2_000_000)).await.unwrap_err();

    assert_eq!(err.code(), "STORE_FAILURE");
    assert!(err.to_string().contains("level write lost"));
    assert_eq!(store.find_balance(user.id).await.unwrap().unwrap().amount, dec(500));
    assert_eq!(store.find_user(user.id).await.unwrap().unwrap().level, 1);

    // the user's unit was released; normal traffic continues
    let change = service.credit(user.id, dec(1)).await.unwrap();
    assert_eq!(change.new_balance, dec(501));
}
