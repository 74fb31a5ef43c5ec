//! Tier-based deletion rule.
//!
//! A user may delete another user only when their level is strictly higher.
//! Nobody may delete themselves, whatever their level.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::User;
use crate::errors::{AppError, AppResult};

/// Decide whether `acting` may remove `target`.
///
/// Pure decision over two loaded records; performs no mutation.
pub fn authorize_deletion(acting: &User, target: &User) -> AppResult<()> {
    if acting.id == target.id {
        return Err(AppError::SelfDeletionForbidden);
    }
    if !acting.outranks(target) {
        return Err(AppError::InsufficientTier);
    }
    Ok(())
}

/// Returned after a successful deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DeletionReceipt {
    pub deleted_user_id: Uuid,
    pub by_user_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_at(level: i32) -> User {
        let mut user = User::new(Uuid::new_v4(), format!("user-{}", level), "hash".to_string());
        user.level = level;
        user
    }

    #[test]
    fn test_higher_tier_may_delete() {
        assert!(authorize_deletion(&user_at(3), &user_at(2)).is_ok());
        assert!(authorize_deletion(&user_at(4), &user_at(1)).is_ok());
    }

    #[test]
    fn test_equal_tier_denied() {
        let result = authorize_deletion(&user_at(2), &user_at(2));
        assert!(matches!(result, Err(AppError::InsufficientTier)));
    }

    #[test]
    fn test_lower_tier_denied() {
        let result = authorize_deletion(&user_at(1), &user_at(4));
        assert!(matches!(result, Err(AppError::InsufficientTier)));
    }

    #[test]
    fn test_self_deletion_denied_at_any_level() {
        for level in 1..=4 {
            let user = user_at(level);
            let result = authorize_deletion(&user, &user);
            assert!(matches!(result, Err(AppError::SelfDeletionForbidden)));
        }
    }
}
