//! Request handling and transformation.
//!
//! # Responsibilities
//! - Extract routing-relevant information (host, path) for the dispatcher
//! - Rebuild the URI once the app segment has been consumed
//! - Read the request ID set by the request-id layer
//!
//! # Design Decisions
//! - Host header first, URI authority as fallback (HTTP/2)
//! - Query string is carried over untouched on rewrite

use axum::http::{
    header::HOST,
    request::Parts,
    uri::{PathAndQuery, Uri},
    HeaderMap,
};

use crate::dispatch::RequestTarget;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Root prefix consumed by the dispatcher (`/admin`), empty when none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppRoot(pub String);

/// The request ID set by the request-id layer, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Dispatcher view of an incoming request.
pub fn target_from_parts(parts: &Parts) -> RequestTarget {
    let host = parts
        .headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| parts.uri.authority().map(|a| a.as_str()))
        .unwrap_or_default();

    RequestTarget::new(host, parts.uri.path())
}

/// `uri` with its path replaced by `/<path_info>`. Returns `None` if the
/// result is not a valid URI.
pub fn rewrite_uri(uri: &Uri, path_info: &str) -> Option<Uri> {
    let path_and_query = match uri.query() {
        Some(query) => format!("/{path_info}?{query}"),
        None => format!("/{path_info}"),
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query).ok()?);
    Uri::from_parts(parts).ok()
}
