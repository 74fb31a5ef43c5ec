//! PostgreSQL ledger store on SeaORM.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, JoinType, Order, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    SqlErr,
};
use uuid::Uuid;

use super::entities::{
    balance::{self, Entity as BalanceEntity},
    user::{self, ActiveModel as UserActiveModel, Entity as UserEntity},
};
use crate::domain::{AccountSummary, Balance, SortOrder, User, BASE_LEVEL};
use crate::errors::{AppError, AppResult};
use crate::infra::ledger::{LedgerStore, LedgerTransaction};
use crate::infra::unit_of_work::SeaLedgerTransaction;

/// Row shape of the listing query
#[derive(Debug, FromQueryResult)]
struct AccountRow {
    id: Uuid,
    username: String,
    amount: Decimal,
}

impl From<AccountRow> for AccountSummary {
    fn from(row: AccountRow) -> Self {
        AccountSummary {
            id: row.id,
            username: row.username,
            amount: row.amount,
        }
    }
}

/// Ledger store backed by a SeaORM connection pool
#[derive(Clone)]
pub struct SeaLedger {
    db: DatabaseConnection,
}

impl SeaLedger {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LedgerStore for SeaLedger {
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(User::from))
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn create_user(&self, username: String, password_hash: String) -> AppResult<User> {
        let now = chrono::Utc::now();
        let active_model = UserActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username),
            password_hash: Set(password_hash),
            level: Set(BASE_LEVEL),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await.map_err(unique_as_conflict)?;
        Ok(User::from(model))
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        // balances.user_id cascades
        let result = UserEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::TargetUserNotFound);
        }

        Ok(())
    }

    async fn find_balance(&self, user_id: Uuid) -> AppResult<Option<Balance>> {
        let result = BalanceEntity::find_by_id(user_id).one(&self.db).await?;
        Ok(result.map(Balance::from))
    }

    async fn list_accounts(&self, order: SortOrder) -> AppResult<Vec<AccountSummary>> {
        let amount = Expr::col((BalanceEntity, balance::Column::Amount)).if_null(0);

        let mut query = UserEntity::find()
            .select_only()
            .column(user::Column::Id)
            .column(user::Column::Username)
            .column_as(amount.clone(), "amount")
            .join(JoinType::LeftJoin, user::Relation::Balance.def());

        query = match order {
            SortOrder::Unsorted => query,
            SortOrder::Ascending => query.order_by(amount, Order::Asc),
            SortOrder::Descending => query.order_by(amount, Order::Desc),
        };

        let rows = query.into_model::<AccountRow>().all(&self.db).await?;
        Ok(rows.into_iter().map(AccountSummary::from).collect())
    }

    async fn begin(&self, user_id: Uuid) -> AppResult<Box<dyn LedgerTransaction>> {
        let tx = SeaLedgerTransaction::begin(&self.db, user_id).await?;
        Ok(Box::new(tx))
    }
}

/// Map unique-constraint violations to `Conflict`, pass everything else through.
fn unique_as_conflict(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict("User"),
        _ => AppError::from(err),
    }
}
