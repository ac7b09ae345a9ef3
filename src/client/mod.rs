use log::info;
use reqwest::{Client, StatusCode};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::config::client::ClientConfig;
use crate::models::quote::Quote;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request to quote server exceeded {0:?}")]
    Timeout(Duration),
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("response error {0}")]
    Status(u16),
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Statuses up to and including 202 Accepted are treated as success.
///
/// This keeps the deployed client's threshold; 203..=299 are rejected even
/// though they are 2xx.
pub fn is_accepted_status(status: StatusCode) -> bool {
    status.as_u16() <= StatusCode::ACCEPTED.as_u16()
}

pub fn quote_line(quote: &Quote) -> String {
    format!("Dólar: {}", quote.bid)
}

/// GETs `url` and decodes `{"bid": string}`. `timeout` covers the whole call.
pub async fn fetch_quote(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<Quote, ClientError> {
    let classify = |e: reqwest::Error| {
        if e.is_timeout() {
            ClientError::Timeout(timeout)
        } else {
            ClientError::Request(e)
        }
    };
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(classify)?;
    let status = response.status();

    if !is_accepted_status(status) {
        return Err(ClientError::Status(status.as_u16()));
    }

    let body = response.bytes().await.map_err(classify)?;

    Ok(serde_json::from_slice(&body)?)
}

/// Replaces the contents of `path` with the single quote line.
pub async fn write_quote_file(path: &Path, quote: &Quote) -> Result<(), ClientError> {
    tokio::fs::write(path, quote_line(quote))
        .await
        .map_err(|source| ClientError::Io {
            path: path.to_path_buf(),
            source,
        })
}

pub async fn run(config: &ClientConfig) -> Result<Quote, ClientError> {
    let client = Client::new();
    let quote = fetch_quote(&client, &config.server_url, config.request_timeout).await?;

    write_quote_file(&config.output_path, &quote).await?;
    info!("wrote bid {} to {:?}", quote.bid, config.output_path);

    Ok(quote)
}
