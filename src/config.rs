use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

const DEFAULT_ADDR: &str = "0.0.0.0:5876";
const DEFAULT_DATABASE: &str = "todo.db";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub log_filter: String,
}

impl Config {
    /// Reads `TODOS_ADDR`, `TODOS_DATABASE` and `RUST_LOG`, after loading a
    /// `.env` file if there is one.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let addr = lookup("TODOS_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let bind_addr = addr
            .parse()
            .with_context(|| format!("invalid TODOS_ADDR {addr:?}"))?;
        Ok(Self {
            bind_addr,
            database_path: lookup("TODOS_DATABASE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE)),
            log_filter: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }
}
