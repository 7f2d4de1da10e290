//! Default inner application.
//!
//! Reports what the dispatcher decided for the request. Deployments embed
//! their own router through [`HttpServer::with_app`](crate::http::HttpServer::with_app).
//! Only resource names are reported; config values and globals stay on the
//! server.

use std::sync::Arc;

use axum::{body::Body, http::Request, routing::any, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

use crate::http::request::AppRoot;
use crate::loader::AppEnvironment;

pub fn router() -> Router {
    Router::new()
        .route("/", any(inspect_handler))
        .route("/{*path}", any(inspect_handler))
}

/// Names of the resources loaded for an app.
#[derive(Debug, Serialize)]
struct LoadedResources<'a> {
    config: Vec<&'a str>,
    events: Vec<&'a str>,
    middleware: &'a [String],
    providers: Vec<&'a str>,
    locale: &'a str,
}

impl<'a> LoadedResources<'a> {
    fn of(env: &'a AppEnvironment) -> Self {
        Self {
            config: env.config.keys().map(String::as_str).collect(),
            events: env.events.listen.keys().map(String::as_str).collect(),
            middleware: &env.middleware,
            providers: env.providers.keys().map(String::as_str).collect(),
            locale: &env.locale,
        }
    }
}

async fn inspect_handler(request: Request<Body>) -> Json<Value> {
    let env = request.extensions().get::<Arc<AppEnvironment>>();
    let root = request
        .extensions()
        .get::<AppRoot>()
        .map(|r| r.0.as_str())
        .unwrap_or_default();

    Json(json!({
        "dispatched": env.is_some(),
        "root": root,
        "path": request.uri().path(),
        "app": env.map(|e| &e.app),
        "resources": env.map(|e| LoadedResources::of(e)),
    }))
}
