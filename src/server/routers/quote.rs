use bytes::Bytes;
use http_body_util::Full;
use hyper::{Request, Response, StatusCode};
use log::error;
use std::sync::Arc;
use thiserror::Error;

use super::{text_response, with_content_type};
use crate::components::exchange::{fetch_usd_brl, ExchangeApiError};
use crate::db::quotes::QuoteDbError;
use crate::models::quote::Quote;
use crate::server::AppState;

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error(transparent)]
    Upstream(#[from] ExchangeApiError),
    #[error(transparent)]
    Persistence(#[from] QuoteDbError),
    #[error("encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl HandlerError {
    fn status(&self) -> StatusCode {
        match self {
            HandlerError::Upstream(e) if e.is_timeout() => StatusCode::REQUEST_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// GET /cotacao
///
/// Fetches the upstream bid, stores it, and answers `{"bid": ...}`. Exactly
/// one response is produced per request, whichever step fails first decides it.
pub async fn handle_get_quote<B>(
    _req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let response = match fetch_and_store(&state).await {
        Ok(body) => with_content_type(StatusCode::OK, "application/json", body),
        Err(err) => error_response(err),
    };

    Ok(response)
}

async fn fetch_and_store(state: &AppState) -> Result<Bytes, HandlerError> {
    let quote = fetch_usd_brl(&state.http, &state.upstream_url, state.upstream_timeout).await?;

    state
        .repository
        .insert_quote(&quote.bid, state.db_timeout)
        .await?;

    let body = serde_json::to_vec(&Quote { bid: quote.bid })?;

    Ok(Bytes::from(body))
}

fn error_response(err: HandlerError) -> Response<Full<Bytes>> {
    let status = err.status();

    if status == StatusCode::REQUEST_TIMEOUT {
        error!("request timeout {}", err);

        return text_response(status, "request timeout");
    }

    error!("fail {}", err);

    text_response(status, err.to_string())
}
