//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::tier::{tier_for, Level, BASE_LEVEL};
use super::Balance;

/// User domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Derived from the balance; never set by clients.
    pub level: Level,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a freshly registered user at the base level
    pub fn new(id: Uuid, username: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            username,
            password_hash,
            level: BASE_LEVEL,
            created_at: now,
            updated_at: now,
        }
    }

    /// Recompute the level from the given balance.
    ///
    /// Returns `true` if the level changed.
    pub fn sync_level(&mut self, balance: &Balance) -> bool {
        let level = tier_for(balance.amount);
        if level == self.level {
            return false;
        }
        self.level = level;
        self.updated_at = Utc::now();
        true
    }

    /// Whether this user outranks `other` (strictly higher level)
    pub fn outranks(&self, other: &User) -> bool {
        self.level > other.level
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// Login name
    #[schema(example = "alice")]
    pub username: String,
    /// Balance-derived tier
    #[schema(example = 1)]
    pub level: Level,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            level: user.level,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn user() -> User {
        User::new(Uuid::new_v4(), "alice".to_string(), "hashed".to_string())
    }

    #[test]
    fn test_new_user_starts_at_base_level() {
        assert_eq!(user().level, BASE_LEVEL);
    }

    #[test]
    fn test_sync_level_follows_balance() {
        let mut user = user();
        let mut balance = Balance::opening(user.id, Decimal::from(2_500_000));

        assert!(user.sync_level(&balance));
        assert_eq!(user.level, 3);

        assert!(!user.sync_level(&balance));

        balance.amount = Decimal::from(10);
        assert!(user.sync_level(&balance));
        assert_eq!(user.level, BASE_LEVEL);
    }

    #[test]
    fn test_outranks_requires_strictly_higher_level() {
        let mut a = user();
        let mut b = user();
        a.level = 2;
        b.level = 2;
        assert!(!a.outranks(&b));

        a.level = 3;
        assert!(a.outranks(&b));
        assert!(!b.outranks(&a));
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let json = serde_json::to_value(user()).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
