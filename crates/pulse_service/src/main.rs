use dotenv::dotenv;
use pulse_service::settings::{self, DEFAULT_PORT};
use tokio::net::TcpListener;
use tracing::{debug, error, info};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    let settings = settings::load_settings()?;
    pulse_service::init_tracing(&settings);
    let port = settings.port.unwrap_or(DEFAULT_PORT);

    if !settings.is_production() {
        debug!("Running in DEV environment");
    }

    let repository = pulse_service::setup_repository(&settings).await?;
    let (app, price_feed) = pulse_service::build_app(repository, &settings);
    let feed_handle = price_feed.start();

    let listener = TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Server running on http://{}", listener.local_addr()?);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
    }

    feed_handle.shutdown().await;
    info!("Server stopped");

    Ok(())
}
