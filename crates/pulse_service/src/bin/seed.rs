use dotenv::dotenv;
use pulse_service::{
    repositories::{pg_token_repository::PgTokenRepository, TokenRepository},
    seed::generate_tokens,
    settings,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    let settings = settings::load_settings()?;
    pulse_service::init_tracing(&settings);

    let database_url = settings
        .database_url
        .as_deref()
        .ok_or("DATABASE_URL must be set")?;
    let db = pulse_service::setup_database(database_url).await?;

    let repository = PgTokenRepository::new(db);
    repository.ensure_schema().await?;

    let tokens = generate_tokens(settings.seed_per_tab(), &mut rand::thread_rng());
    let count = tokens.len();
    repository.seed(tokens).await?;

    println!("Seeded {} tokens", count);
    Ok(())
}
