use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::subscription::Subscription;
use crate::repository::{StoreError, SubscriptionRepository};

/// HashMap-backed repository with the same observable behaviour as the
/// Postgres one. Useful for exercising the service layer without a
/// database at hand.
#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    rows: Mutex<HashMap<String, Subscription>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> MutexGuard<'_, HashMap<String, Subscription>> {
        // A poisoned lock only means some other thread panicked mid-write;
        // the map itself is still usable.
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn list(&self) -> Result<Vec<Subscription>, StoreError> {
        Ok(self.rows().values().cloned().collect())
    }

    async fn add(&self, email: &str) -> Result<(), StoreError> {
        let mut rows = self.rows();

        match rows.get_mut(email) {
            // Matches the upsert: created_at is left untouched.
            Some(subscription) => subscription.active = true,
            None => {
                rows.insert(
                    email.to_string(),
                    Subscription {
                        email: email.to_string(),
                        active: true,
                        created_at: Utc::now(),
                    },
                );
            }
        }

        Ok(())
    }

    async fn delete(&self, email: &str) -> Result<(), StoreError> {
        self.rows().remove(email);

        Ok(())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Subscription>, StoreError> {
        Ok(self.rows().get(email).cloned())
    }

    async fn set_active(&self, email: &str, active: bool) -> Result<(), StoreError> {
        if let Some(subscription) = self.rows().get_mut(email) {
            subscription.active = active;
        }

        Ok(())
    }
}
