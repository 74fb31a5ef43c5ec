//! User service tests: tier-gated deletion and the account listing.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use digi_wallet::domain::{AccountSummary, Balance, SortOrder, User};
use digi_wallet::errors::{AppError, AppResult};
use digi_wallet::infra::{LedgerStore, LedgerTransaction, MemoryLedger};
use digi_wallet::services::{BalanceManager, BalanceService, UserManager, UserService};

struct Fixture {
    store: Arc<MemoryLedger>,
    balances: BalanceManager,
    users: UserManager,
}

impl Fixture {
    fn new() -> Self {
        let store = Arc::new(MemoryLedger::new());
        Self {
            balances: BalanceManager::new(store.clone()),
            users: UserManager::new(store.clone()),
            store,
        }
    }

    /// Register a user and credit them `amount` (skipped when zero).
    async fn user_with(&self, username: &str, amount: i64) -> User {
        let user = self
            .store
            .create_user(username.to_string(), "hashed".to_string())
            .await
            .unwrap();
        if amount > 0 {
            self.balances.credit(user.id, Decimal::from(amount)).await.unwrap();
        }
        self.store.find_user(user.id).await.unwrap().unwrap()
    }
}

// =============================================================================
// Deletion
// =============================================================================

#[tokio::test]
async fn test_higher_tier_deletes_lower() {
    let fx = Fixture::new();
    let boss = fx.user_with("boss", 2_500_000).await;
    let clerk = fx.user_with("clerk", 1_500_000).await;
    assert_eq!((boss.level, clerk.level), (3, 2));

    let receipt = fx.users.delete_user(boss.id, clerk.id).await.unwrap();

    assert_eq!(receipt.deleted_user_id, clerk.id);
    assert_eq!(receipt.by_user_id, boss.id);
    assert!(fx.store.find_user(clerk.id).await.unwrap().is_none());
    assert!(fx.store.find_balance(clerk.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_equal_tier_cannot_delete() {
    let fx = Fixture::new();
    let a = fx.user_with("a", 1_200_000).await;
    let b = fx.user_with("b", 1_900_000).await;

    let result = fx.users.delete_user(a.id, b.id).await;

    assert!(matches!(result, Err(AppError::InsufficientTier)));
    assert!(fx.store.find_user(b.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_lower_tier_cannot_delete_higher() {
    let fx = Fixture::new();
    let low = fx.user_with("low", 0).await;
    let high = fx.user_with("high", 3_500_000).await;

    assert!(matches!(
        fx.users.delete_user(low.id, high.id).await,
        Err(AppError::InsufficientTier)
    ));
}

#[tokio::test]
async fn test_self_deletion_forbidden_at_any_tier() {
    let fx = Fixture::new();
    let top = fx.user_with("top", 3_000_001).await;
    assert_eq!(top.level, 4);

    assert!(matches!(
        fx.users.delete_user(top.id, top.id).await,
        Err(AppError::SelfDeletionForbidden)
    ));
    assert!(fx.store.find_user(top.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_missing_acting_or_target_user() {
    let fx = Fixture::new();
    let user = fx.user_with("alice", 2_000_001).await;

    assert!(matches!(
        fx.users.authorize_deletion(Uuid::new_v4(), user.id).await,
        Err(AppError::ActingUserNotFound)
    ));
    assert!(matches!(
        fx.users.authorize_deletion(user.id, Uuid::new_v4()).await,
        Err(AppError::TargetUserNotFound)
    ));
}

#[tokio::test]
async fn test_demotion_revokes_deletion_rights() {
    let fx = Fixture::new();
    let boss = fx.user_with("boss", 2_000_001).await;
    let clerk = fx.user_with("clerk", 1_000_001).await;
    fx.users.authorize_deletion(boss.id, clerk.id).await.unwrap();

    fx.balances
        .debit(boss.id, Decimal::from(1_000_000))
        .await
        .unwrap();

    assert!(matches!(
        fx.users.authorize_deletion(boss.id, clerk.id).await,
        Err(AppError::InsufficientTier)
    ));
}

// =============================================================================
// Listing
// =============================================================================

fn amounts(accounts: &[AccountSummary]) -> Vec<Decimal> {
    accounts.iter().map(|a| a.amount).collect()
}

#[tokio::test]
async fn test_listing_includes_users_without_balance() {
    let fx = Fixture::new();
    let idle = fx.user_with("idle", 0).await;
    fx.user_with("busy", 250).await;

    let accounts = fx.users.list_users(SortOrder::Unsorted).await.unwrap();

    assert_eq!(accounts.len(), 2);
    let idle_row = accounts.iter().find(|a| a.id == idle.id).unwrap();
    assert_eq!(idle_row.amount, Decimal::ZERO);
    assert_eq!(idle_row.username, "idle");
}

#[tokio::test]
async fn test_listing_sort_orders() {
    let fx = Fixture::new();
    fx.user_with("mid", 500).await;
    fx.user_with("none", 0).await;
    fx.user_with("rich", 9_000).await;

    let desc = fx.users.list_users(SortOrder::Descending).await.unwrap();
    assert_eq!(
        amounts(&desc),
        vec![Decimal::from(9_000), Decimal::from(500), Decimal::ZERO]
    );

    let asc = fx.users.list_users(SortOrder::Ascending).await.unwrap();
    assert_eq!(
        amounts(&asc),
        vec![Decimal::ZERO, Decimal::from(500), Decimal::from(9_000)]
    );
}

#[tokio::test]
async fn test_listing_unknown_token_is_unsorted() {
    let fx = Fixture::new();
    fx.user_with("first", 10).await;
    fx.user_with("second", 30).await;
    fx.user_with("third", 20).await;

    let order = SortOrder::from_token(Some("sideways"));
    let accounts = fx.users.list_users(order).await.unwrap();

    let names: Vec<_> = accounts.iter().map(|a| a.username.as_str()).collect();
    assert_eq!(names, vec!["first", "second", "third"]);
}

// =============================================================================
// Store failures
// =============================================================================

/// Store whose every operation fails
struct FailingLedger;

fn outage<T>() -> AppResult<T> {
    Err(sea_orm::DbErr::Custom("store offline".to_string()).into())
}

#[async_trait]
impl LedgerStore for FailingLedger {
    async fn find_user(&self, _id: Uuid) -> AppResult<Option<User>> {
        outage()
    }

    async fn find_user_by_username(&self, _username: &str) -> AppResult<Option<User>> {
        outage()
    }

    async fn create_user(&self, _username: String, _password_hash: String) -> AppResult<User> {
        outage()
    }

    async fn delete_user(&self, _id: Uuid) -> AppResult<()> {
        outage()
    }

    async fn find_balance(&self, _user_id: Uuid) -> AppResult<Option<Balance>> {
        outage()
    }

    async fn list_accounts(&self, _order: SortOrder) -> AppResult<Vec<AccountSummary>> {
        outage()
    }

    async fn begin(&self, _user_id: Uuid) -> AppResult<Box<dyn LedgerTransaction>> {
        outage()
    }
}

#[tokio::test]
async fn test_store_failures_pass_through() {
    let store: Arc<dyn LedgerStore> = Arc::new(FailingLedger);
    let users = UserManager::new(store.clone());
    let balances = BalanceManager::new(store);

    let errors = [
        users.list_users(SortOrder::Unsorted).await.unwrap_err(),
        users
            .authorize_deletion(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err(),
        balances
            .credit(Uuid::new_v4(), Decimal::ONE)
            .await
            .unwrap_err(),
    ];

    for err in errors {
        assert_eq!(err.code(), "STORE_FAILURE");
        assert!(err.to_string().contains("store offline"));
    }
}
