//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → middleware.rs (multi-app dispatch, URI rewrite)
//!     → request.rs (host/path extraction for the dispatcher)
//!     → inner application (inspect.rs by default)
//! ```

pub mod inspect;
pub mod middleware;
pub mod request;
pub mod server;

pub use middleware::multi_app_middleware;
pub use request::{AppRoot, X_REQUEST_ID};
pub use server::HttpServer;
