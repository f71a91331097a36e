use std::future::{ready, Future, Ready};
use std::pin::Pin;

use actix_web::dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use tracing::Instrument;
use uuid::Uuid;

pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Correlation ids for one request. The trace id is reused from the
/// `x-trace-id` request header when the caller supplied one, the span id is
/// always fresh. Built once by the middleware and immutable afterwards.
#[derive(Debug, Clone)]
pub struct TraceContext {
    pub trace_id: String,
    pub span_id: String,
}

impl TraceContext {
    pub fn new() -> Self {
        Self::with_trace_id(Uuid::new_v4().to_string())
    }

    pub fn with_trace_id(trace_id: String) -> Self {
        Self {
            trace_id,
            span_id: Uuid::new_v4().to_string(),
        }
    }

    fn from_headers(headers: &HeaderMap) -> Self {
        match headers
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
        {
            Some(trace_id) if !trace_id.is_empty() => Self::with_trace_id(trace_id.to_string()),
            _ => Self::new(),
        }
    }
}

impl Default for TraceContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Hands the middleware-installed context to handlers as a plain parameter.
impl FromRequest for TraceContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(request: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let context = request
            .extensions()
            .get::<TraceContext>()
            .cloned()
            .unwrap_or_else(|| Self::from_headers(request.headers()));

        ready(Ok(context))
    }
}

/// Outermost middleware: resolves the `TraceContext` before anything else
/// runs, stores it in the request extensions, wraps the rest of the request
/// in a span carrying both ids and echoes `x-trace-id` on the response.
///
/// The ids live as span fields, so every event emitted below (handlers,
/// service, repository) picks them up through the JSON storage layer without
/// the inner layers ever touching transport metadata.
pub struct RequestTrace;

impl<S, B> Transform<S, ServiceRequest> for RequestTrace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestTraceMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTraceMiddleware { service }))
    }
}

pub struct RequestTraceMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestTraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, request: ServiceRequest) -> Self::Future {
        let context = TraceContext::from_headers(request.headers());
        request.extensions_mut().insert(context.clone());

        let span = tracing::info_span!(
            "Trace",
            trace_id = %context.trace_id,
            span_id = %context.span_id,
        );

        let next = self.service.call(request);

        Box::pin(
            async move {
                let mut response = next.await?;

                if let Ok(value) = HeaderValue::from_str(&context.trace_id) {
                    response
                        .headers_mut()
                        .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
                }

                Ok(response)
            }
            .instrument(span),
        )
    }
}
