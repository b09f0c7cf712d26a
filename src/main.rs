use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod db;
mod error;
mod models;
mod playlist;
mod quotes;
mod routes;
mod track;
mod utils;
mod views;

use crate::config::Config;
use crate::routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    if !config.sounds_path.exists() {
        std::fs::create_dir_all(&config.sounds_path)?;
    }

    let pool = db::connect(&config.database_url).await?;
    db::init(&pool).await?;

    if let Some(path) = &config.quotes_path {
        let mut conn = pool.acquire().await?;
        quotes::load_quotes(&mut conn, path).await?;
    }

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, sounds = %config.sounds_path.display(), "homeboard listening");

    let state = AppState {
        pool,
        config: Arc::new(config),
    };
    axum::serve(listener, routes::router(state)).await?;

    Ok(())
}
