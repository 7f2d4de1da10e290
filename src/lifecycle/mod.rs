//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build dispatcher → Start watcher → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → server drains, reload task exits
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then dispatcher, then listeners
//! - Config reloads never stop the server; a bad file keeps the old settings

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
