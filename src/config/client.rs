use std::{path::PathBuf, time::Duration};

use super::{env_millis, env_or, ConfigError};

pub const SERVER_URL: &str = "http://127.0.0.1:8080/cotacao";
pub const OUTPUT_PATH: &str = "cotacao.txt";
pub const REQUEST_TIMEOUT_MS: u64 = 3000;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub output_path: PathBuf,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            server_url: SERVER_URL.to_string(),
            output_path: PathBuf::from(OUTPUT_PATH),
            request_timeout: Duration::from_millis(REQUEST_TIMEOUT_MS),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(ClientConfig {
            server_url: env_or("SERVER_URL", "a URL", SERVER_URL.to_string())?,
            output_path: env_or("OUTPUT_PATH", "a file path", PathBuf::from(OUTPUT_PATH))?,
            request_timeout: env_millis("REQUEST_TIMEOUT_MS", REQUEST_TIMEOUT_MS)?,
        })
    }
}
