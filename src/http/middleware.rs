//! Multi-application dispatch middleware.
//!
//! Resolves the app for every request before the inner application routes
//! it. Denied or reverse-mapped apps are answered with 404 here; requests
//! without an app continue unmodified.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::dispatch::{DispatchError, DispatchRequest, Dispatcher};
use crate::http::request::{request_id, rewrite_uri, target_from_parts, AppRoot};

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        match self {
            DispatchError::AppNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()).into_response(),
            DispatchError::Load(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Application failed to load").into_response()
            }
        }
    }
}

/// Resolve the app, rewrite the URI below its root and attach the loaded
/// [`AppEnvironment`](crate::loader::AppEnvironment) to the request.
pub async fn multi_app_middleware(
    State(dispatcher): State<Arc<Dispatcher>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();
    let request_id = request_id(&parts.headers).to_string();
    let mut target = target_from_parts(&parts);

    // Loading touches the filesystem.
    let worker = dispatcher.clone();
    let joined = tokio::task::spawn_blocking(move || {
        let outcome = worker.dispatch(&mut target);
        (target, outcome)
    })
    .await;

    let (target, outcome) = match joined {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Dispatch task failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Dispatch failed").into_response();
        }
    };

    match outcome {
        Ok(Some(env)) => {
            if !target.root().is_empty() {
                match rewrite_uri(&parts.uri, target.path_info()) {
                    Some(uri) => parts.uri = uri,
                    None => tracing::warn!(
                        request_id = %request_id,
                        path_info = %target.path_info(),
                        "Could not rewrite request URI"
                    ),
                }
            }
            tracing::debug!(
                request_id = %request_id,
                app = %env.app.name,
                root = %target.root(),
                "Request dispatched"
            );
            parts.extensions.insert(AppRoot(target.root().to_string()));
            parts.extensions.insert(Arc::new(env));
            next.run(Request::from_parts(parts, body)).await
        }
        Ok(None) => {
            tracing::debug!(request_id = %request_id, "No app matched, passing through");
            next.run(Request::from_parts(parts, body)).await
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Dispatch rejected");
            e.into_response()
        }
    }
}
