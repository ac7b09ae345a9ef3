use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{self, HeaderValue};
use hyper::{Method, Request, Response, StatusCode};
use std::sync::Arc;

use super::AppState;
use crate::config::server::QUOTE_ROUTE;

mod quote;

pub async fn route<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let is_quote = req.method() == Method::GET && req.uri().path() == QUOTE_ROUTE;

    if is_quote {
        return quote::handle_get_quote(req, state).await;
    }

    Ok(text_response(StatusCode::NOT_FOUND, "Not Found"))
}

pub(super) fn text_response(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    with_content_type(status, "text/plain; charset=utf-8", body.into())
}

pub(super) fn with_content_type(
    status: StatusCode,
    content_type: &'static str,
    body: Bytes,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));

    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::server::ServerConfig;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let state = Arc::new(AppState::from_config(&ServerConfig::default()));
        let req = Request::builder().uri("/api/v1/rates").body(()).unwrap();

        let response = route(req, state).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"Not Found");
    }

    #[tokio::test]
    async fn post_to_quote_route_is_not_found() {
        let state = Arc::new(AppState::from_config(&ServerConfig::default()));
        let req = Request::builder()
            .method(Method::POST)
            .uri(QUOTE_ROUTE)
            .body(())
            .unwrap();

        let response = route(req, state).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
