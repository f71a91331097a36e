use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde::Deserialize;

use crate::service::{SubscriptionError, SubscriptionService};
use crate::trace::TraceContext;

#[derive(Deserialize, Debug)]
pub struct NewSubscriptionBody {
    pub email: String,
}

#[derive(Deserialize, Debug)]
pub struct UpdateSubscriptionsStatusBody {
    pub emails: Vec<String>,
    pub active: bool,
}

#[derive(Deserialize, Debug)]
pub struct DeleteSubscriptionsBody {
    pub emails: Vec<String>,
}

#[tracing::instrument(
    name = "Creating a new subscription handler",
    skip(body, service, trace),
    fields(
        trace_id = %trace.trace_id,
        span_id = %trace.span_id,
        subscriber_email = %body.email
    )
)]
pub async fn handle_create_subscription(
    body: web::Json<NewSubscriptionBody>,
    service: web::Data<dyn SubscriptionService>,
    trace: TraceContext,
) -> Result<HttpResponse, ApiError> {
    tracing::info!(operation = "subscribe", "Operation started");

    service
        .subscribe(&body.email)
        .await
        .map_err(|err| operation_failed("subscribe", err.into()))?;

    tracing::info!(operation = "subscribe", outcome = "success", "Operation finished");

    Ok(HttpResponse::Created().finish())
}

#[tracing::instrument(
    name = "Deleting a subscription handler",
    skip(email, service, trace),
    fields(
        trace_id = %trace.trace_id,
        span_id = %trace.span_id,
        subscriber_email = %email.as_str()
    )
)]
pub async fn handle_delete_subscription(
    email: web::Path<String>,
    service: web::Data<dyn SubscriptionService>,
    trace: TraceContext,
) -> Result<HttpResponse, ApiError> {
    tracing::info!(operation = "unsubscribe", "Operation started");

    service
        .unsubscribe(&email)
        .await
        .map_err(|err| operation_failed("unsubscribe", err.into()))?;

    tracing::info!(operation = "unsubscribe", outcome = "success", "Operation finished");

    Ok(HttpResponse::Ok().finish())
}

#[tracing::instrument(
    name = "Fetching a subscription handler",
    skip(email, service, trace),
    fields(
        trace_id = %trace.trace_id,
        span_id = %trace.span_id,
        subscriber_email = %email.as_str()
    )
)]
pub async fn handle_get_subscription(
    email: web::Path<String>,
    service: web::Data<dyn SubscriptionService>,
    trace: TraceContext,
) -> Result<HttpResponse, ApiError> {
    tracing::info!(operation = "get", "Operation started");

    let subscription = service
        .get_subscription(&email)
        .await
        .map_err(|err| operation_failed("get", err.into()))?
        .ok_or_else(|| operation_failed("get", ApiError::NotFound))?;

    tracing::info!(operation = "get", outcome = "success", "Operation finished");

    Ok(HttpResponse::Ok().json(subscription))
}

#[tracing::instrument(
    name = "Listing all subscriptions handler",
    skip(service, trace),
    fields(
        trace_id = %trace.trace_id,
        span_id = %trace.span_id
    )
)]
pub async fn handle_list_subscriptions(
    service: web::Data<dyn SubscriptionService>,
    trace: TraceContext,
) -> Result<HttpResponse, ApiError> {
    tracing::info!(operation = "list", "Operation started");

    let subscriptions = service
        .list_subscriptions()
        .await
        .map_err(|err| operation_failed("list", err.into()))?;

    tracing::info!(
        operation = "list",
        outcome = "success",
        subscription_count = subscriptions.len(),
        "Operation finished"
    );

    Ok(HttpResponse::Ok().json(subscriptions))
}

#[tracing::instrument(
    name = "Updating subscription statuses handler",
    skip(body, service, trace),
    fields(
        trace_id = %trace.trace_id,
        span_id = %trace.span_id,
        email_count = body.emails.len(),
        active = body.active
    )
)]
pub async fn handle_update_subscriptions_status(
    body: web::Json<UpdateSubscriptionsStatusBody>,
    service: web::Data<dyn SubscriptionService>,
    trace: TraceContext,
) -> Result<HttpResponse, ApiError> {
    tracing::info!(
        operation = "update_status",
        emails = ?body.emails,
        "Operation started"
    );

    service
        .update_subscription_status(&body.emails, body.active)
        .await
        .map_err(|err| operation_failed("update_status", err.into()))?;

    tracing::info!(
        operation = "update_status",
        outcome = "success",
        "Operation finished"
    );

    Ok(HttpResponse::Ok().finish())
}

#[tracing::instrument(
    name = "Deleting subscriptions in bulk handler",
    skip(body, service, trace),
    fields(
        trace_id = %trace.trace_id,
        span_id = %trace.span_id,
        email_count = body.emails.len()
    )
)]
pub async fn handle_delete_subscriptions(
    body: web::Json<DeleteSubscriptionsBody>,
    service: web::Data<dyn SubscriptionService>,
    trace: TraceContext,
) -> Result<HttpResponse, ApiError> {
    tracing::info!(
        operation = "delete_subscriptions",
        emails = ?body.emails,
        "Operation started"
    );

    service
        .delete_subscriptions(&body.emails)
        .await
        .map_err(|err| operation_failed("delete_subscriptions", err.into()))?;

    tracing::info!(
        operation = "delete_subscriptions",
        outcome = "success",
        "Operation finished"
    );

    Ok(HttpResponse::Ok().finish())
}

#[tracing::instrument(
    name = "Unsubscribing a whole domain handler",
    skip(domain, service, trace),
    fields(
        trace_id = %trace.trace_id,
        span_id = %trace.span_id,
        domain = %domain.as_str()
    )
)]
pub async fn handle_delete_domain_subscriptions(
    domain: web::Path<String>,
    service: web::Data<dyn SubscriptionService>,
    trace: TraceContext,
) -> Result<HttpResponse, ApiError> {
    tracing::info!(operation = "unsubscribe_domain", "Operation started");

    service
        .unsubscribe_domain(&domain)
        .await
        .map_err(|err| operation_failed("unsubscribe_domain", err.into()))?;

    tracing::info!(
        operation = "unsubscribe_domain",
        outcome = "success",
        "Operation finished"
    );

    Ok(HttpResponse::Ok().finish())
}

#[derive(thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    ValidationError(String),
    #[error("No subscription exists for the requested email.")]
    NotFound,
    #[error("Something went wrong while processing the request.")]
    InternalError(#[source] SubscriptionError),
}

impl ApiError {
    /// Failure class carried by the operation-end log event.
    pub fn classification(&self) -> &'static str {
        match self {
            ApiError::ValidationError(_) => "invalid-argument",
            ApiError::NotFound => "not-found",
            ApiError::InternalError(_) => "internal",
        }
    }
}

impl From<SubscriptionError> for ApiError {
    fn from(err: SubscriptionError) -> Self {
        match err {
            SubscriptionError::Validation(message) => ApiError::ValidationError(message),
            err @ SubscriptionError::Store(_) => ApiError::InternalError(err),
            err @ SubscriptionError::Bulk { .. } => ApiError::InternalError(err),
        }
    }
}

impl std::fmt::Debug for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;

        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            write!(f, "\nCaused by:\n\t({})", cause)?;
            source = cause.source();
        }

        Ok(())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Emits the operation-end event for a failed operation before the error is
/// turned into a response.
fn operation_failed(operation: &'static str, err: ApiError) -> ApiError {
    match &err {
        ApiError::InternalError(_) => tracing::error!(
            operation,
            outcome = "failure",
            classification = err.classification(),
            error = ?err,
            "Operation finished"
        ),
        _ => tracing::warn!(
            operation,
            outcome = "failure",
            classification = err.classification(),
            error = ?err,
            "Operation finished"
        ),
    }

    err
}
