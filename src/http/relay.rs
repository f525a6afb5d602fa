//! The `/cotacao` relay endpoint.

use std::time::Instant;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};

use crate::http::request;
use crate::http::server::AppState;
use crate::observability::metrics;

pub const RELAY_PATH: &str = "/cotacao";

/// Relay the current bid, any method.
///
/// Only the bid leaves the service. Every failure becomes a bare 500; the
/// cause is logged, never sent.
pub async fn relay_quotation(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let started = Instant::now();
    let request_id = request::request_id(&headers);

    let response = match state.service.get_quote(request_id).await {
        Ok(record) => (StatusCode::OK, Json(record.bid().to_owned())).into_response(),
        Err(e) => {
            tracing::warn!(
                request_id = %request_id,
                kind = e.kind(),
                error = %e,
                "Quotation relay failed"
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    };

    metrics::record_request(response.status().as_u16(), started);
    response
}

/// Any path other than [`RELAY_PATH`].
pub async fn not_found(uri: Uri) -> StatusCode {
    tracing::debug!(path = %uri.path(), "No route matched");
    StatusCode::NOT_FOUND
}
