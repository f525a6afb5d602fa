//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the relay handler and a 404 fallback
//! - Wire up middleware (tracing, request ID, ceiling timeout)
//! - Bind server to listener
//! - Stop on the shutdown broadcast

use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, middleware, routing::any, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::http::relay::{not_found, relay_quotation, RELAY_PATH};
use crate::http::request::{
    drop_malformed_request_id, propagate_request_id_layer, set_request_id_layer,
};
use crate::service::QuotationService;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<QuotationService>,
}

/// HTTP server for the quotation relay.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server around `service`.
    ///
    /// `handler_ceiling` bounds a whole inbound request; it sits above the
    /// fetch and persist budgets and only fires if they are misconfigured.
    /// When it does fire the caller gets the same bare 500 as any failure.
    pub fn new(service: Arc<QuotationService>, handler_ceiling: Duration) -> Self {
        let state = AppState { service };
        Self {
            router: Self::build_router(state, handler_ceiling),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState, handler_ceiling: Duration) -> Router {
        Router::new()
            .route(RELAY_PATH, any(relay_quotation))
            .fallback(not_found)
            .with_state(state)
            .layer(TimeoutLayer::with_status_code(
                StatusCode::INTERNAL_SERVER_ERROR,
                handler_ceiling,
            ))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
            .layer(middleware::map_request(drop_malformed_request_id))
    }

    /// The router, for serving or for driving requests directly.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
