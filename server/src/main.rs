use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use jumbomap_server::config::Config;
use jumbomap_server::mail::{create_mailer, MailError};
use jumbomap_server::routes::create_routes;
use jumbomap_server::state::AppState;

#[derive(Debug, Error)]
enum StartupError {
    #[error("failed to connect to database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to run migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("failed to set up email transport: {0}")]
    Mail(#[from] MailError),

    #[error("server failed: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Successfully connected to database");

    sqlx::migrate!().run(&pool).await?;

    tracing::info!("Migrations run successfully");

    if config.invitations.base_url.is_none() {
        tracing::warn!("PUBLIC_BASE_URL is not set; invitation links cannot be built until it is");
    }

    let mailer = create_mailer(&config.mail)?;
    let state = AppState::with_pool(pool, mailer, config.invitations.clone());
    let app = create_routes(state, &config);

    tracing::info!("🚀 Server running at http://{}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
