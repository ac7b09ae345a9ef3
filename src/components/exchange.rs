use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

use crate::models::quote::{ExchangeResponse, Quote};

#[derive(Error, Debug)]
pub enum ExchangeApiError {
    #[error("upstream request exceeded {0:?}")]
    Timeout(Duration),
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("upstream returned status {0}")]
    Status(u16),
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("upstream returned an empty bid")]
    EmptyBid,
}

impl ExchangeApiError {
    pub fn is_timeout(&self) -> bool {
        match self {
            ExchangeApiError::Timeout(_) => true,
            ExchangeApiError::Reqwest(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Fetches the USD-BRL bid. `deadline` bounds the whole exchange, body included.
pub async fn fetch_usd_brl(
    client: &Client,
    url: &str,
    deadline: Duration,
) -> Result<Quote, ExchangeApiError> {
    match tokio::time::timeout(deadline, request_usd_brl(client, url)).await {
        Ok(res) => res,
        Err(_) => Err(ExchangeApiError::Timeout(deadline)),
    }
}

async fn request_usd_brl(client: &Client, url: &str) -> Result<Quote, ExchangeApiError> {
    let response = client.get(url).send().await?;
    let status = response.status();

    if !status.is_success() {
        return Err(ExchangeApiError::Status(status.as_u16()));
    }

    let body = response.bytes().await?;

    parse_exchange_response(&body)
}

fn parse_exchange_response(body: &[u8]) -> Result<Quote, ExchangeApiError> {
    let parsed: ExchangeResponse = serde_json::from_slice(body)?;

    if parsed.usd_brl.bid.is_empty() {
        return Err(ExchangeApiError::EmptyBid);
    }

    Ok(Quote {
        bid: parsed.usd_brl.bid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::hanging_endpoint;

    const UPSTREAM_PATH: &str = "/json/last/USD-BRL";

    #[test]
    fn test_parse_exchange_response_success() {
        let body = br#"{
            "USDBRL": {
                "code": "USD",
                "codein": "BRL",
                "name": "Dolar Americano/Real Brasileiro",
                "high": "5.4512",
                "low": "5.4012",
                "bid": "5.4301",
                "ask": "5.4311",
                "timestamp": "1716235200"
            }
        }"#;

        let quote = parse_exchange_response(body).unwrap();

        assert_eq!(quote.bid, "5.4301");
    }

    #[test]
    fn test_parse_keeps_bid_verbatim() {
        let body = br#"{"USDBRL": {"bid": "5.430000000000000001"}}"#;

        let quote = parse_exchange_response(body).unwrap();

        assert_eq!(quote.bid, "5.430000000000000001");
    }

    #[test]
    fn test_parse_missing_pair_is_decode_error() {
        let body = br#"{"status": 404, "code": "CoinNotExists"}"#;

        let res = parse_exchange_response(body);

        assert!(matches!(res, Err(ExchangeApiError::Decode(_))));
    }

    #[test]
    fn test_parse_empty_bid() {
        let res = parse_exchange_response(br#"{"USDBRL": {"bid": ""}}"#);

        assert!(matches!(res, Err(ExchangeApiError::EmptyBid)));
    }

    #[tokio::test]
    async fn test_fetch_usd_brl_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", UPSTREAM_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"USDBRL": {"code": "USD", "bid": "5.12"}}"#)
            .expect(1)
            .create_async()
            .await;
        let url = format!("{}{}", server.url(), UPSTREAM_PATH);

        let quote = fetch_usd_brl(&Client::new(), &url, Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(quote.bid, "5.12");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_usd_brl_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", UPSTREAM_PATH)
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;
        let url = format!("{}{}", server.url(), UPSTREAM_PATH);

        let res = fetch_usd_brl(&Client::new(), &url, Duration::from_secs(5)).await;

        match res {
            Err(ExchangeApiError::Status(code)) => assert_eq!(code, 503),
            other => panic!("Expected Status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_usd_brl_timeout() {
        let url = hanging_endpoint(UPSTREAM_PATH).await;

        let err = fetch_usd_brl(&Client::new(), &url, Duration::from_millis(50))
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert!(matches!(err, ExchangeApiError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_fetch_usd_brl_connection_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let url = format!("http://{}{}", addr, UPSTREAM_PATH);

        let err = fetch_usd_brl(&Client::new(), &url, Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, ExchangeApiError::Reqwest(_)));
        assert!(!err.is_timeout());
    }
}
