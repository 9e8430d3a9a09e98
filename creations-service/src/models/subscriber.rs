//! Subscriber aggregate owned by the entitlement store.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Subscription level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Premium,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Premium => "premium",
        }
    }

    pub fn is_premium(&self) -> bool {
        matches!(self, Self::Premium)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of a subscriber as read at the start of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Subscriber {
    pub user_id: String,
    pub tier: Tier,
    pub free_usage: i32,
}

impl Subscriber {
    /// A user the store has never seen: free tier, nothing used.
    pub fn new_free(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            tier: Tier::Free,
            free_usage: 0,
        }
    }
}
