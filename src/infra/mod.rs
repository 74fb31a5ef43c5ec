//! Infrastructure layer - External systems integration
//!
//! - Ledger store abstraction with PostgreSQL and in-memory backends
//! - Database connections and migrations
//! - Redis cache for rate limiting
//! - Per-user transactional units

pub mod cache;
pub mod db;
pub mod ledger;
pub mod memory;
pub mod repositories;
pub mod unit_of_work;

pub use cache::Cache;
pub use db::{Database, Migrator};
pub use ledger::{settle, LedgerStore, LedgerTransaction};
pub use memory::MemoryLedger;
pub use repositories::SeaLedger;
pub use unit_of_work::SeaLedgerTransaction;

#[cfg(any(test, feature = "test-utils"))]
pub use ledger::MockLedgerStore;
