use apis::setup_routes;
use axum::Router;
use jobs::price_feed::PriceFeed;
use models::tokens::PriceUpdate;
use repositories::{
    memory_repository::InMemoryTokenRepository, pg_token_repository::PgTokenRepository,
    TokenRepository,
};
use services::token_service::TokenService;
use sqlx::postgres::PgPool;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

pub mod apis;
pub mod jobs;
pub mod models;
pub mod repositories;
pub mod seed;
pub mod services;
pub mod settings;
pub mod utils;

pub struct AppState {
    pub token_service: Arc<TokenService>,
    pub price_updates: broadcast::Sender<PriceUpdate>,
}

pub async fn setup_database(database_url: &str) -> Result<Arc<PgPool>, sqlx::Error> {
    let pool = PgPool::connect(database_url).await?;
    Ok(Arc::new(pool))
}

/// Postgres when `DATABASE_URL` is set, otherwise a freshly seeded
/// in-memory store.
pub async fn setup_repository(
    settings: &settings::Settings,
) -> Result<Arc<dyn TokenRepository>, Box<dyn std::error::Error>> {
    match settings.database_url.as_deref() {
        Some(database_url) => {
            let db = setup_database(database_url).await?;
            let repository = PgTokenRepository::new(db);
            repository.ensure_schema().await?;
            if repository.all_ids().await?.is_empty() {
                warn!("Tokens table is empty, run the seed binary to populate it");
            }
            info!("Using Postgres token store");
            Ok(Arc::new(repository))
        }
        None => {
            let repository = InMemoryTokenRepository::new();
            let tokens = seed::generate_tokens(settings.seed_per_tab(), &mut rand::thread_rng());
            repository.seed(tokens).await?;
            info!(
                count = repository.len().await,
                "Using in-memory token store"
            );
            Ok(Arc::new(repository))
        }
    }
}

/// Wires the query service, the price feed and the routes around one store.
/// The feed is returned unstarted.
pub fn build_app(
    token_repository: Arc<dyn TokenRepository>,
    settings: &settings::Settings,
) -> (Router, Arc<PriceFeed>) {
    let (price_updates, _) = broadcast::channel(settings.broadcast_capacity());
    let token_service = Arc::new(TokenService::new(token_repository.clone()));
    let price_feed = Arc::new(PriceFeed::new(
        token_repository,
        price_updates.clone(),
        settings.feed_config(),
    ));

    let router = setup_routes()
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(AppState {
            token_service,
            price_updates,
        }));

    (router, price_feed)
}

pub fn init_tracing(settings: &settings::Settings) {
    let level = if settings.is_production() {
        tracing::Level::INFO
    } else {
        tracing::Level::DEBUG
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_names(true)
        .with_ansi(!settings.is_production())
        .init();
}
