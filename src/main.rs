use newsletter_subscriptions::config::get_configuration;
use newsletter_subscriptions::startup::Application;
use newsletter_subscriptions::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber(
        String::from("newsletter_subscriptions"),
        String::from("info"),
    );

    init_subscriber(subscriber);

    let config = get_configuration().expect("Missing configuration file.");
    let application = Application::build(config).await?;

    tracing::info!("Server listening on port {}", application.get_port());

    application.run_until_stop().await
}
