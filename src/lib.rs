//! Digi Wallet - user balances with balance-derived tiers
//!
//! Users hold one balance each. Every credit or debit recomputes the
//! user's level from the new amount, and a user may only delete users on
//! a strictly lower level.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Tiers, balances and the deletion rule
//! - **services**: Application use cases over the ledger store
//! - **infra**: Ledger stores (PostgreSQL, in-memory), migrations, Redis
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Response envelope
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server against PostgreSQL
//! cargo run -- serve
//!
//! # Start the server without a database
//! cargo run -- serve --in-memory
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Balance, BalanceChange, Password, User};
pub use errors::{AppError, AppResult};
pub use infra::{LedgerStore, MemoryLedger};
