use async_trait::async_trait;

use crate::domain::subscription::Subscription;

pub mod memory;
pub mod postgres;

/// Persistence abstraction for subscriptions, one row per subscriber.
///
/// Implementations never create their own connections; whatever pool or
/// storage they need is handed to them at construction.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Every stored subscription. No ordering is guaranteed by the contract.
    async fn list(&self) -> Result<Vec<Subscription>, StoreError>;

    /// Insert `email` as an active subscription. An existing row is
    /// re-activated; an already-active row observes no change. Never an
    /// error for duplicates.
    async fn add(&self, email: &str) -> Result<(), StoreError>;

    /// Remove the row for `email`. Deleting an absent email is a no-op
    /// success.
    async fn delete(&self, email: &str) -> Result<(), StoreError>;

    /// The row for `email`, or `None` when absent.
    async fn get_by_email(&self, email: &str) -> Result<Option<Subscription>, StoreError>;

    /// Set the `active` flag on an existing row. Absent emails are skipped,
    /// never created.
    async fn set_active(&self, email: &str, active: bool) -> Result<(), StoreError>;
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Timed out waiting for a database connection from the pool.")]
    PoolTimeout(#[source] sqlx::Error),
    #[error("Failed to execute a query against the subscriptions store.")]
    Query(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => StoreError::PoolTimeout(err),
            _ => StoreError::Query(err),
        }
    }
}
