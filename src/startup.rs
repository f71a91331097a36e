use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Pool, Postgres};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use crate::config::{DatabaseSettings, Settings};
use crate::repository::postgres::PostgresSubscriptionRepository;
use crate::routes::{
    handle_create_subscription, handle_delete_domain_subscriptions, handle_delete_subscription,
    handle_delete_subscriptions, handle_get_subscription, handle_list_subscriptions,
    handle_update_subscriptions_status, health_check,
};
use crate::service::{DefaultSubscriptionService, SubscriptionService};
use crate::trace::RequestTrace;

pub struct Application {
    pub port: u16,
    pub server: Server,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, std::io::Error> {
        let db_pool = get_connection_db_pool(&config.database);

        let listener =
            TcpListener::bind(config.get_address()).expect("Failed to bind the address.");
        let port = listener.local_addr().unwrap().port();
        let server = run(listener, db_pool)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(listener: TcpListener, db_pool: PgPool) -> Result<Server, std::io::Error> {
    let repository = Arc::new(PostgresSubscriptionRepository::new(db_pool));
    let service: Arc<dyn SubscriptionService> = Arc::new(DefaultSubscriptionService::new(repository));
    let service = web::Data::from(service);

    let server = HttpServer::new(move || {
        // App is where your application logic lives: routing, middlewares, request handler, etc
        App::new()
            // 'wrap' method adds a middleware to the App. Middlewares run outside-in,
            // in reverse registration order: RequestTrace resolves the correlation ids
            // first, so the request logger's span inherits them
            .wrap(TracingLogger::default())
            .wrap(RequestTrace)
            .route("/health_check", web::get().to(health_check))
            .route("/subscriptions", web::get().to(handle_list_subscriptions))
            .route("/subscriptions", web::post().to(handle_create_subscription))
            .route("/subscriptions", web::delete().to(handle_delete_subscriptions))
            .route(
                "/subscriptions/status",
                web::post().to(handle_update_subscriptions_status),
            )
            .route(
                "/subscriptions/domains/{domain}",
                web::delete().to(handle_delete_domain_subscriptions),
            )
            .route("/subscriptions/{email}", web::get().to(handle_get_subscription))
            .route(
                "/subscriptions/{email}",
                web::delete().to(handle_delete_subscription),
            )
            .app_data(service.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

pub fn get_connection_db_pool(config: &DatabaseSettings) -> Pool<Postgres> {
    PgPoolOptions::new()
        .acquire_timeout(config.get_acquire_timeout())
        .connect_lazy_with(config.get_db_options())
}
