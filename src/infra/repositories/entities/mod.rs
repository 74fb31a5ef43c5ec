//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod balance;
pub mod user;

pub use balance::{ActiveModel as BalanceActiveModel, Entity as BalanceEntity};
pub use user::{ActiveModel as UserActiveModel, Entity as UserEntity};
