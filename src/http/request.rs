//! Request identification.
//!
//! # Responsibilities
//! - Generate a request ID (UUID v4) when the caller sends none
//! - Propagate it back on the response
//! - Expose it to handlers as the persistence key
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A caller-supplied ID that is not a UUID is dropped before the ID is
//!   stamped, so the echoed header, the logs and the stored row all agree

use axum::extract::Request;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Layer that stamps `x-request-id` on requests missing one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), MakeRequestUuid)
}

/// Layer that copies `x-request-id` onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID))
}

/// Remove an `x-request-id` that is not a UUID so a fresh one is generated.
pub async fn drop_malformed_request_id(mut request: Request) -> Request {
    let malformed = request
        .headers()
        .get(X_REQUEST_ID)
        .is_some_and(|v| parse(v).is_none());
    if malformed {
        if let Some(value) = request.headers_mut().remove(X_REQUEST_ID) {
            tracing::debug!(supplied = ?value, "Discarding malformed request id");
        }
    }
    request
}

fn parse(value: &HeaderValue) -> Option<Uuid> {
    value.to_str().ok().and_then(|v| Uuid::parse_str(v).ok())
}

/// The request's UUID, or a fresh one if the header is missing or malformed.
pub fn request_id(headers: &HeaderMap) -> Uuid {
    headers
        .get(X_REQUEST_ID)
        .and_then(parse)
        .unwrap_or_else(Uuid::new_v4)
}
