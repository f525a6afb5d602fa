//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;
use uuid::Uuid;

use quote_relay::config::PersistencePolicy;
use quote_relay::http::HttpServer;
use quote_relay::lifecycle::Shutdown;
use quote_relay::service::{QuotationService, ServiceSettings};
use quote_relay::storage::{QuotationRepository, QuotationStore, StorageError};
use quote_relay::upstream::UpstreamFetcher;
use quote_relay::QuotationRecord;

pub const FETCH_BUDGET: Duration = Duration::from_millis(200);
pub const PERSIST_BUDGET: Duration = Duration::from_millis(10);

/// A well-formed upstream body with the given bid.
pub fn upstream_body(bid: &str) -> String {
    format!(
        r#"{{"USDBRL":{{"code":"USD","codein":"BRL","name":"Dólar Americano/Real Brasileiro","high":"5.4500","low":"5.4012","varBid":"-0.0110","pctChange":"-0.20","bid":"{bid}","ask":"5.4331","timestamp":"1718049600","create_date":"2024-06-10 17:00:00"}}}}"#
    )
}

fn status_line(status: u16) -> &'static str {
    match status {
        200 => "200 OK",
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    }
}

/// Start a programmable backend on an ephemeral port.
///
/// `f` runs once per connection; it may sleep before returning the status and
/// body to send.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 2048];
                let _ = socket.read(&mut buf).await;

                let (status, body) = f().await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line(status),
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Upstream answering every request with `bid` after `delay`.
pub async fn start_upstream(bid: &'static str, delay: Duration) -> SocketAddr {
    start_programmable_backend(move || async move {
        tokio::time::sleep(delay).await;
        (200, upstream_body(bid))
    })
    .await
}

/// Backend that accepts connections and never answers.
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _held = socket;
                tokio::time::sleep(Duration::from_secs(3600)).await;
            });
        }
    });

    addr
}

/// An address nobody listens on.
pub async fn closed_port() -> SocketAddr {
    TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap()
        .local_addr()
        .unwrap()
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Repository that blocks for `delay`, then succeeds or fails.
pub struct StubRepository {
    delay: Duration,
    fail: bool,
    writes: AtomicUsize,
    last_bid: std::sync::Mutex<Option<String>>,
}

impl StubRepository {
    pub fn ok(delay: Duration) -> Arc<Self> {
        Self::build(delay, false)
    }

    pub fn failing() -> Arc<Self> {
        Self::build(Duration::ZERO, true)
    }

    fn build(delay: Duration, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            delay,
            fail,
            writes: AtomicUsize::new(0),
            last_bid: std::sync::Mutex::new(None),
        })
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn last_bid(&self) -> Option<String> {
        self.last_bid.lock().unwrap().clone()
    }
}

impl QuotationRepository for StubRepository {
    fn create_row(&self, _request_id: Uuid, record: &QuotationRecord) -> Result<(), StorageError> {
        std::thread::sleep(self.delay);
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StorageError::Unavailable("read-only database".into()));
        }
        *self.last_bid.lock().unwrap() = Some(record.bid().to_string());
        Ok(())
    }
}

/// Service against `upstream` and `repository` with the default budgets.
pub fn service(
    upstream: SocketAddr,
    repository: Arc<dyn QuotationRepository>,
    policy: PersistencePolicy,
) -> QuotationService {
    let url = Url::parse(&format!("http://{}/json/last/USD-BRL", upstream)).unwrap();
    let fetcher = UpstreamFetcher::with_client(http_client(), url, "USDBRL");
    QuotationService::new(
        fetcher,
        QuotationStore::new(repository),
        ServiceSettings {
            fetch_budget: FETCH_BUDGET,
            persist_budget: PERSIST_BUDGET,
            persistence_policy: policy,
        },
    )
}

/// Relay router around `service`, for driving requests without a socket.
pub fn relay_router(service: QuotationService) -> axum::Router {
    HttpServer::new(Arc::new(service), Duration::from_secs(1)).router()
}

/// Serve the relay on an ephemeral port until the returned `Shutdown` fires.
pub async fn start_relay(service: QuotationService) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(Arc::new(service), Duration::from_secs(1));
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}
