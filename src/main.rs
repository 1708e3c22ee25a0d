use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

mod config;
mod db;
mod error;
mod models;
mod routes;
mod views;

use config::Config;
use db::Database;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .init();

    let db = Database::connect(&config.database_path)?;
    let app = routes::router(db);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!(
        database = %config.database_path.display(),
        "todos running on http://{}",
        config.bind_addr
    );

    axum::serve(listener, app)
        .await
        .context("server terminated")?;

    Ok(())
}
