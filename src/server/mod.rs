use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use log::{error, info};
use reqwest::Client;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use std::{io, net::SocketAddr};
use tokio::net::TcpListener;

use routers::route;

use crate::{config::server::ServerConfig, db::quotes::QuoteRepository};

mod routers;

/// Everything a request needs. Nothing in here is mutated after startup.
#[derive(Debug)]
pub struct AppState {
    pub http: Client,
    pub repository: QuoteRepository,
    pub upstream_url: String,
    pub upstream_timeout: Duration,
    pub db_timeout: Duration,
}

impl AppState {
    pub fn from_config(config: &ServerConfig) -> Self {
        AppState {
            http: Client::new(),
            repository: QuoteRepository::new(config.db_path.clone()),
            upstream_url: config.upstream_url.clone(),
            upstream_timeout: config.upstream_timeout,
            db_timeout: config.db_timeout,
        }
    }
}

pub struct QuoteServer {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl QuoteServer {
    pub async fn bind(config: &ServerConfig) -> Result<Self, io::Error> {
        let listener = TcpListener::bind(config.addr).await?;
        let state = Arc::new(AppState::from_config(config));

        Ok(QuoteServer { listener, state })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, io::Error> {
        self.listener.local_addr()
    }

    /// Accepts connections until `shutdown` resolves. Each connection is
    /// served on its own task.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), io::Error>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!("Listening on http://{}", self.local_addr()?);

        loop {
            let (stream, _) = tokio::select! {
                accepted = self.listener.accept() => accepted?,
                _ = &mut shutdown => {
                    info!("Shutting down quote server");
                    return Ok(());
                }
            };
            let io = TokioIo::new(stream);
            let state = Arc::clone(&self.state);

            tokio::task::spawn(async move {
                let service = service_fn(move |req| route(req, Arc::clone(&state)));

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!("Failed to serve connection: {:?}", err);
                }
            });
        }
    }
}

pub async fn run_server<F>(config: &ServerConfig, shutdown: F) -> Result<(), io::Error>
where
    F: Future<Output = ()>,
{
    QuoteServer::bind(config).await?.serve(shutdown).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quote::Quote;
    use tempfile::tempdir;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn serves_quotes_until_shutdown() {
        let mut upstream = mockito::Server::new_async().await;
        let _mock = upstream
            .mock("GET", "/json/last/USD-BRL")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"USDBRL": {"bid": "5.43"}}"#)
            .create_async()
            .await;
        let dir = tempdir().unwrap();
        let config = ServerConfig {
            addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            db_path: dir.path().join("fc-dolar.db"),
            upstream_url: format!("{}/json/last/USD-BRL", upstream.url()),
            upstream_timeout: Duration::from_secs(5),
            db_timeout: Duration::from_secs(5),
        };
        QuoteRepository::new(config.db_path.clone()).provision().unwrap();

        let server = QuoteServer::bind(&config).await.unwrap();
        let addr = server.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.serve(async {
            let _ = stopped.await;
        }));

        let response = Client::new()
            .get(format!("http://{}/cotacao", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let quote: Quote = response.json().await.unwrap();
        assert_eq!(quote.bid, "5.43");

        let missing = Client::new()
            .get(format!("http://{}/other", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(missing.status(), 404);

        stop.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }
}
