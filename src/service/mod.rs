use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::subscription::Subscription;
use crate::repository::{StoreError, SubscriptionRepository};

/// Business rules for managing subscriptions: input validation, idempotency
/// and bulk semantics. Persistence stays behind `SubscriptionRepository`.
#[async_trait]
pub trait SubscriptionService: Send + Sync {
    /// Every subscription currently stored, active or not.
    async fn list_subscriptions(&self) -> Result<Vec<Subscription>, SubscriptionError>;

    /// Register `email` as an active subscriber. Subscribing an email that
    /// is already active changes nothing; a deactivated one is reactivated.
    async fn subscribe(&self, email: &str) -> Result<(), SubscriptionError>;

    /// Remove the subscription for `email`. Succeeds whether or not the
    /// email was ever subscribed; no validation is applied.
    async fn unsubscribe(&self, email: &str) -> Result<(), SubscriptionError>;

    /// The stored record for `email`. Absence is `Ok(None)`, not an error.
    async fn get_subscription(&self, email: &str)
        -> Result<Option<Subscription>, SubscriptionError>;

    /// Whether `email` currently has an active subscription. Emails that
    /// were never subscribed read as `false`.
    async fn get_subscription_status(&self, email: &str) -> Result<bool, SubscriptionError>;

    /// Flip the active flag on each listed email. Absent addresses are
    /// skipped, never created. A failing address does not abort the rest of
    /// the batch; failures are aggregated into the returned error.
    async fn update_subscription_status(
        &self,
        emails: &[String],
        active: bool,
    ) -> Result<(), SubscriptionError>;

    /// Remove each listed email, with the same per-address independence as
    /// `update_subscription_status`.
    async fn delete_subscriptions(&self, emails: &[String]) -> Result<(), SubscriptionError>;

    /// Remove every subscription whose email belongs to `domain`, including
    /// subdomains of it.
    async fn unsubscribe_domain(&self, domain: &str) -> Result<(), SubscriptionError>;
}

#[derive(thiserror::Error, Debug)]
pub enum SubscriptionError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Bulk operation failed for {} out of {} addresses.", .failed.len(), .attempted)]
    Bulk {
        attempted: usize,
        failed: Vec<(String, StoreError)>,
    },
}

pub struct DefaultSubscriptionService<R> {
    repository: Arc<R>,
}

impl<R> DefaultSubscriptionService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R> SubscriptionService for DefaultSubscriptionService<R>
where
    R: SubscriptionRepository,
{
    #[tracing::instrument(name = "Listing subscriptions", skip(self))]
    async fn list_subscriptions(&self) -> Result<Vec<Subscription>, SubscriptionError> {
        Ok(self.repository.list().await?)
    }

    #[tracing::instrument(
        name = "Subscribing an email",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    async fn subscribe(&self, email: &str) -> Result<(), SubscriptionError> {
        let email =
            SubscriberEmail::parse(email.to_string()).map_err(SubscriptionError::Validation)?;

        self.repository.add(email.as_ref()).await?;

        Ok(())
    }

    #[tracing::instrument(
        name = "Unsubscribing an email",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    async fn unsubscribe(&self, email: &str) -> Result<(), SubscriptionError> {
        self.repository.delete(email).await?;

        Ok(())
    }

    #[tracing::instrument(
        name = "Fetching a subscription",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    async fn get_subscription(
        &self,
        email: &str,
    ) -> Result<Option<Subscription>, SubscriptionError> {
        Ok(self.repository.get_by_email(email).await?)
    }

    #[tracing::instrument(
        name = "Checking a subscription status",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    async fn get_subscription_status(&self, email: &str) -> Result<bool, SubscriptionError> {
        let subscription = self.repository.get_by_email(email).await?;

        Ok(subscription.map_or(false, |subscription| subscription.active))
    }

    #[tracing::instrument(
        name = "Updating subscription statuses",
        skip(self, emails),
        fields(email_count = emails.len(), active)
    )]
    async fn update_subscription_status(
        &self,
        emails: &[String],
        active: bool,
    ) -> Result<(), SubscriptionError> {
        let mut failed = Vec::new();

        for email in emails {
            if let Err(err) = self.repository.set_active(email, active).await {
                tracing::error!(
                    subscriber_email = %email,
                    "Failed to update a subscription status: {:?}",
                    err
                );
                failed.push((email.clone(), err));
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(SubscriptionError::Bulk {
                attempted: emails.len(),
                failed,
            })
        }
    }

    #[tracing::instrument(
        name = "Deleting subscriptions",
        skip(self, emails),
        fields(email_count = emails.len())
    )]
    async fn delete_subscriptions(&self, emails: &[String]) -> Result<(), SubscriptionError> {
        let mut failed = Vec::new();

        for email in emails {
            if let Err(err) = self.repository.delete(email).await {
                tracing::error!(
                    subscriber_email = %email,
                    "Failed to delete a subscription: {:?}",
                    err
                );
                failed.push((email.clone(), err));
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(SubscriptionError::Bulk {
                attempted: emails.len(),
                failed,
            })
        }
    }

    #[tracing::instrument(name = "Unsubscribing a whole domain", skip(self))]
    async fn unsubscribe_domain(&self, domain: &str) -> Result<(), SubscriptionError> {
        let matching: Vec<String> = self
            .repository
            .list()
            .await?
            .into_iter()
            .filter(|subscription| email_in_domain(&subscription.email, domain))
            .map(|subscription| subscription.email)
            .collect();

        tracing::info!(email_count = matching.len(), "Resolved the domain match set");

        self.delete_subscriptions(&matching).await
    }
}

/// An email belongs to `domain` when the text after its `@` equals the
/// domain or is a subdomain of it: `a@mail.bulk.com` is in `bulk.com`,
/// `a@notbulk.com` is not.
fn email_in_domain(email: &str, domain: &str) -> bool {
    match email.rsplit_once('@') {
        Some((_, email_domain)) => match email_domain.strip_suffix(domain) {
            Some("") => true,
            Some(prefix) => prefix.ends_with('.'),
            None => false,
        },
        None => false,
    }
}
