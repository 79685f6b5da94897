use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use carlot_rentals::cache::AppCache;
use carlot_rentals::config::Config;
use carlot_rentals::pricing::{PgRentalStore, RentalPricingEngine};
use carlot_rentals::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("carlot_rentals=debug,tower_http=info")),
        )
        .init();

    let config = Config::from_env().context("loading configuration")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("connecting to database")?;

    if config.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("running migrations")?;
        info!("Migrations applied");
    }

    let engine = RentalPricingEngine::new(config.pricing).context("building pricing engine")?;

    let state = AppState {
        store: Arc::new(PgRentalStore::new(pool)),
        cache: AppCache::new(),
        engine: Arc::new(engine),
        currency: Arc::from(config.currency.as_str()),
    };

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app(state))
        .await
        .context("server error")?;

    Ok(())
}
