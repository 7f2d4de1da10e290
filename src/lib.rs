//! Multi-application request dispatcher.
//!
//! Decides for every request which sub-application handles it, rewrites the
//! request below that app's root and loads the app's configuration, events,
//! middleware, providers and language pack.

pub mod config;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod loader;
pub mod observability;

pub use config::DispatcherConfig;
pub use dispatch::{Dispatcher, Resolution};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use loader::AppEnvironment;
