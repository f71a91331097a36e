use actix_web::{HttpResponse, Responder};

/// Endpoint used by clients and orchestrators to know if the server is up
#[tracing::instrument(name = "Health Check handler")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok()
}
