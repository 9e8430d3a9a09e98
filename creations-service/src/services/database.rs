//! PostgreSQL persistence for creations and subscribers.

use super::metrics::DB_QUERY_DURATION;
use super::stores::{CreationStore, EntitlementStore};
use crate::models::{Creation, NewCreation, Subscriber};
use async_trait::async_trait;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "creations-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl CreationStore for Database {
    #[instrument(skip(self, creation), fields(user_id = %creation.user_id, kind = %creation.kind))]
    async fn insert(&self, creation: NewCreation) -> Result<Creation, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_creation"])
            .start_timer();

        let created = sqlx::query_as::<_, Creation>(
            r#"
            INSERT INTO creations (creation_id, user_id, prompt, content, kind, publish)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING creation_id, user_id, prompt, content, kind, publish, created_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&creation.user_id)
        .bind(&creation.prompt)
        .bind(&creation.content)
        .bind(creation.kind)
        .bind(creation.publish)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to insert creation: {}", e)))?;

        timer.observe_duration();

        info!(creation_id = %created.creation_id, "Creation stored");

        Ok(created)
    }

    #[instrument(skip(self))]
    async fn list_for_user(&self, user_id: &str, limit: i64) -> Result<Vec<Creation>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_user_creations"])
            .start_timer();

        let creations = sqlx::query_as::<_, Creation>(
            r#"
            SELECT creation_id, user_id, prompt, content, kind, publish, created_utc
            FROM creations
            WHERE user_id = $1
            ORDER BY created_utc DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list creations: {}", e)))?;

        timer.observe_duration();
        Ok(creations)
    }

    #[instrument(skip(self))]
    async fn list_published(&self, limit: i64) -> Result<Vec<Creation>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_published_creations"])
            .start_timer();

        let creations = sqlx::query_as::<_, Creation>(
            r#"
            SELECT creation_id, user_id, prompt, content, kind, publish, created_utc
            FROM creations
            WHERE publish
            ORDER BY created_utc DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list published creations: {}", e))
        })?;

        timer.observe_duration();
        Ok(creations)
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl EntitlementStore for Database {
    #[instrument(skip(self))]
    async fn subscriber(&self, user_id: &str) -> Result<Subscriber, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_subscriber"])
            .start_timer();

        // Registers unknown users as free with no usage. The second branch
        // sees rows that existed before this statement started.
        let subscriber = sqlx::query_as::<_, Subscriber>(
            r#"
            WITH inserted AS (
                INSERT INTO subscribers (user_id)
                VALUES ($1)
                ON CONFLICT (user_id) DO NOTHING
                RETURNING user_id, tier, free_usage
            )
            SELECT user_id, tier, free_usage FROM inserted
            UNION ALL
            SELECT user_id, tier, free_usage FROM subscribers WHERE user_id = $1
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to load subscriber: {}", e)))?;

        let subscriber = match subscriber {
            Some(s) => s,
            // A concurrent first request inserted the row after our snapshot.
            None => sqlx::query_as::<_, Subscriber>(
                "SELECT user_id, tier, free_usage FROM subscribers WHERE user_id = $1",
            )
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to load subscriber: {}", e))
            })?,
        };

        timer.observe_duration();
        Ok(subscriber)
    }

    #[instrument(skip(self))]
    async fn increment_free_usage(&self, user_id: &str, limit: i32) -> Result<Option<i32>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["increment_free_usage"])
            .start_timer();

        let updated: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE subscribers
            SET free_usage = free_usage + 1, updated_utc = NOW()
            WHERE user_id = $1 AND free_usage < $2
            RETURNING free_usage
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to increment free usage: {}", e))
        })?;

        timer.observe_duration();
        Ok(updated)
    }
}
