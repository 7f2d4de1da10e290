//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router around the inner application
//! - Wire up middleware (request ID, tracing, timeout, multi-app dispatch)
//! - Bind server to listener and stop on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, middleware, Router};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::DispatcherConfig;
use crate::dispatch::Dispatcher;
use crate::http::inspect;
use crate::http::middleware::multi_app_middleware;
use crate::http::request::request_id;
use crate::lifecycle::Shutdown;

/// HTTP front end of the dispatcher.
pub struct HttpServer {
    router: Router,
    config: DispatcherConfig,
}

impl HttpServer {
    /// Serve the built-in inspection app behind the dispatcher.
    pub fn new(config: DispatcherConfig, dispatcher: Arc<Dispatcher>) -> Self {
        Self::with_app(config, dispatcher, inspect::router())
    }

    /// Serve `app` behind the dispatcher. `app` routes on the rewritten URI.
    pub fn with_app(config: DispatcherConfig, dispatcher: Arc<Dispatcher>, app: Router) -> Self {
        let router = Self::build_router(&config, dispatcher, app);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The inner app is mounted as the fallback service so that it routes
    /// after the dispatcher has rewritten the URI.
    #[allow(deprecated)]
    pub fn build_router(config: &DispatcherConfig, dispatcher: Arc<Dispatcher>, app: Router) -> Router {
        Router::new()
            .fallback_service(app)
            .layer(middleware::from_fn_with_state(dispatcher, multi_app_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %request_id(req.headers()),
                )
            }))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for embedding or testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            default_app = %self.config.app.default_app,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(Shutdown::wait(shutdown.subscribe()))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
