//! Persistence seams used by the handlers.

use crate::models::{Creation, NewCreation, Subscriber};
use async_trait::async_trait;
use service_core::error::AppError;

/// Append-only store of creations.
#[async_trait]
pub trait CreationStore: Send + Sync {
    async fn insert(&self, creation: NewCreation) -> Result<Creation, AppError>;

    /// The user's creations, newest first.
    async fn list_for_user(&self, user_id: &str, limit: i64) -> Result<Vec<Creation>, AppError>;

    /// Published creations from every user, newest first.
    async fn list_published(&self, limit: i64) -> Result<Vec<Creation>, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

/// Owner of the subscriber aggregate.
#[async_trait]
pub trait EntitlementStore: Send + Sync {
    /// Current snapshot for `user_id`, registering unknown users as free.
    async fn subscriber(&self, user_id: &str) -> Result<Subscriber, AppError>;

    /// Atomically add one to the free usage counter while it is below
    /// `limit`. Returns the new count, or `None` when nothing was updated.
    async fn increment_free_usage(&self, user_id: &str, limit: i32)
        -> Result<Option<i32>, AppError>;
}
