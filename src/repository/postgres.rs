use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::subscription::Subscription;
use crate::repository::{StoreError, SubscriptionRepository};

#[derive(Clone)]
pub struct PostgresSubscriptionRepository {
    db_pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    #[tracing::instrument(name = "Listing all subscriptions from the database", skip(self))]
    async fn list(&self) -> Result<Vec<Subscription>, StoreError> {
        let subscriptions = sqlx::query(
            r#"
            SELECT email, active, created_at
            FROM subscriptions
            ORDER BY id
            "#,
        )
        .map(|row: PgRow| Subscription {
            email: row.get("email"),
            active: row.get("active"),
            created_at: row.get("created_at"),
        })
        .fetch_all(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            StoreError::from(err)
        })?;

        Ok(subscriptions)
    }

    #[tracing::instrument(
        name = "Saving subscription details in the database",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    async fn add(&self, email: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (email, active)
            VALUES ($1, TRUE)
            ON CONFLICT (email) DO UPDATE SET active = TRUE
            "#,
        )
        .bind(email)
        .execute(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            StoreError::from(err)
        })?;

        Ok(())
    }

    #[tracing::instrument(
        name = "Deleting a subscription from the database",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    async fn delete(&self, email: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM subscriptions
            WHERE email = $1
            "#,
        )
        .bind(email)
        .execute(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            StoreError::from(err)
        })?;

        tracing::debug!(rows_affected = result.rows_affected(), "Delete applied");
        Ok(())
    }

    #[tracing::instrument(
        name = "Fetching a subscription by email from the database",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    async fn get_by_email(&self, email: &str) -> Result<Option<Subscription>, StoreError> {
        let subscription = sqlx::query(
            r#"
            SELECT email, active, created_at
            FROM subscriptions
            WHERE email = $1
            "#,
        )
        .bind(email)
        .map(|row: PgRow| Subscription {
            email: row.get("email"),
            active: row.get("active"),
            created_at: row.get("created_at"),
        })
        .fetch_optional(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            StoreError::from(err)
        })?;

        Ok(subscription)
    }

    #[tracing::instrument(
        name = "Updating a subscription status in the database",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    async fn set_active(&self, email: &str, active: bool) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET active = $2
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(active)
        .execute(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            StoreError::from(err)
        })?;

        tracing::debug!(rows_affected = result.rows_affected(), "Update applied");
        Ok(())
    }
}
