//! Repository layer - Data access abstraction
//!
//! SeaORM entities and the PostgreSQL implementation of the ledger store.

pub(crate) mod entities;
mod ledger_repository;

pub use ledger_repository::SeaLedger;
