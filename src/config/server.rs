use std::{net::SocketAddr, path::PathBuf, time::Duration};

use super::{env_millis, env_or, ConfigError};

pub const PORT: u16 = 8080;
pub const QUOTE_ROUTE: &str = "/cotacao";
pub const DB_PATH: &str = "fc-dolar.db";
pub const UPSTREAM_URL: &str = "https://economia.awesomeapi.com.br/json/last/USD-BRL";
pub const UPSTREAM_TIMEOUT_MS: u64 = 200;
pub const DB_TIMEOUT_MS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub upstream_url: String,
    pub upstream_timeout: Duration,
    pub db_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            addr: SocketAddr::from(([127, 0, 0, 1], PORT)),
            db_path: PathBuf::from(DB_PATH),
            upstream_url: UPSTREAM_URL.to_string(),
            upstream_timeout: Duration::from_millis(UPSTREAM_TIMEOUT_MS),
            db_timeout: Duration::from_millis(DB_TIMEOUT_MS),
        }
    }
}

impl ServerConfig {
    /// `PORT`, `DB_PATH`, `UPSTREAM_URL`, `UPSTREAM_TIMEOUT_MS`, `DB_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port: u16 = env_or("PORT", "u16 number", PORT)?;

        Ok(ServerConfig {
            addr: SocketAddr::from(([127, 0, 0, 1], port)),
            db_path: env_or("DB_PATH", "a file path", PathBuf::from(DB_PATH))?,
            upstream_url: env_or("UPSTREAM_URL", "a URL", UPSTREAM_URL.to_string())?,
            upstream_timeout: env_millis("UPSTREAM_TIMEOUT_MS", UPSTREAM_TIMEOUT_MS)?,
            db_timeout: env_millis("DB_TIMEOUT_MS", DB_TIMEOUT_MS)?,
        })
    }
}
