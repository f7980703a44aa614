use anyhow::Result;
use common::database::{DatabaseConfig, health_check, init_pool};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use warbler::{AppState, config::AppConfig, db, routes};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = AppConfig::load()?;
    if config.uses_default_secret() {
        warn!("SECRET_KEY is not set, using the development default");
    }

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    if std::env::args().nth(1).as_deref() == Some("initdb") {
        db::reset(&pool).await?;
        println!("Initialized the database.");
        return Ok(());
    }

    db::migrate(&pool).await?;

    info!("Starting Warbler");

    let app = routes::create_router(AppState::new(pool, &config));

    let listener = TcpListener::bind(config.bind_address.as_str()).await?;
    info!("Warbler listening on {}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
