//! In-memory stores for tests and local runs without PostgreSQL.

use super::stores::{CreationStore, EntitlementStore};
use crate::models::{Creation, NewCreation, Subscriber, Tier};
use async_trait::async_trait;
use dashmap::DashMap;
use service_core::error::AppError;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryEntitlements {
    subscribers: DashMap<String, Subscriber>,
    increment_calls: AtomicUsize,
    fail_increments: AtomicBool,
}

impl InMemoryEntitlements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscriber(self, user_id: &str, tier: Tier, free_usage: i32) -> Self {
        self.subscribers.insert(
            user_id.to_string(),
            Subscriber {
                user_id: user_id.to_string(),
                tier,
                free_usage,
            },
        );
        self
    }

    /// Make every increment fail, as a broken store would.
    pub fn failing_increments(self) -> Self {
        self.fail_increments.store(true, Ordering::SeqCst);
        self
    }

    pub fn free_usage(&self, user_id: &str) -> Option<i32> {
        self.subscribers.get(user_id).map(|s| s.free_usage)
    }

    pub fn increment_calls(&self) -> usize {
        self.increment_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EntitlementStore for InMemoryEntitlements {
    async fn subscriber(&self, user_id: &str) -> Result<Subscriber, AppError> {
        let entry = self
            .subscribers
            .entry(user_id.to_string())
            .or_insert_with(|| Subscriber::new_free(user_id));
        Ok(entry.value().clone())
    }

    async fn increment_free_usage(
        &self,
        user_id: &str,
        limit: i32,
    ) -> Result<Option<i32>, AppError> {
        self.increment_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_increments.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "entitlement store unavailable"
            )));
        }

        // The shard lock held by get_mut makes check-and-increment atomic.
        Ok(self.subscribers.get_mut(user_id).and_then(|mut s| {
            if s.free_usage < limit {
                s.free_usage += 1;
                Some(s.free_usage)
            } else {
                None
            }
        }))
    }
}

#[derive(Default)]
pub struct InMemoryCreations {
    rows: RwLock<Vec<Creation>>,
}

impl InMemoryCreations {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<Creation> {
        self.rows.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl CreationStore for InMemoryCreations {
    async fn insert(&self, creation: NewCreation) -> Result<Creation, AppError> {
        let creation = creation.into_creation();
        self.rows.write().await.push(creation.clone());
        Ok(creation)
    }

    async fn list_for_user(&self, user_id: &str, limit: i64) -> Result<Vec<Creation>, AppError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .rev()
            .filter(|c| c.user_id == user_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn list_published(&self, limit: i64) -> Result<Vec<Creation>, AppError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .rev()
            .filter(|c| c.publish)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
