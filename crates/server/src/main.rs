use std::sync::Arc;

use anyhow::Context;
use cinemax_metadata::provider::CatalogProvider;
use cinemax_metadata::tmdb::TmdbClient;
use cinemax_server::config::{Config, LogFormat};
use cinemax_server::favorites::FavoritesStore;
use cinemax_server::routes::{build_router, cors_layer};
use cinemax_server::state::AppState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    if config.tmdb_api_key.is_empty() {
        error!("TMDB_API_KEY is not set, upstream requests will be rejected");
    }

    info!(db_path = %config.db_path, "connecting to database");
    let pool = cinemax_db::connect(&config.db_path)
        .await
        .context("failed to connect to database")?;

    // Run migrations
    cinemax_db::migrate::run(&pool)
        .await
        .context("failed to run migrations")?;
    info!("migrations complete");

    let favorites = FavoritesStore::load(pool.clone()).await;

    let mut client =
        TmdbClient::new(config.tmdb_api_key.clone()).with_language(config.language.clone());
    if let Some(base_url) = &config.tmdb_base_url {
        info!(base_url = %base_url, "using custom metadata endpoint");
        client = client.with_base_url(base_url.clone());
    }
    info!(provider = client.name(), language = client.language(), "catalog client ready");

    let state = AppState::new(pool, Arc::new(client), favorites, config.language.clone());
    let app = build_router(state).layer(cors_layer(config.cors_origin.as_deref()));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .context("failed to bind")?;
    info!(addr = %config.bind_addr, "server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
