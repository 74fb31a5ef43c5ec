//! Domain layer - Core business entities and rules
//!
//! Everything here is independent of HTTP and persistence:
//! tier derivation, balance arithmetic, the deletion rule and the
//! account listing projection.

pub mod balance;
pub mod deletion;
pub mod listing;
pub mod password;
pub mod tier;
pub mod user;

pub use balance::{validate_amount, Balance, BalanceChange, AMOUNT_LIMIT, AMOUNT_SCALE};
pub use deletion::{authorize_deletion, DeletionReceipt};
pub use listing::{project_accounts, AccountSummary, SortOrder};
pub use password::Password;
pub use tier::{tier_for, Level, BASE_LEVEL, TIER_THRESHOLDS};
pub use user::{User, UserResponse};
