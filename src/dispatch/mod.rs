//! Multi-application dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path info)
//!     → script.rs   (explicit bind / dedicated entry point?)
//!     → domain.rs   (host → sub-domain → `*`)
//!     → path.rs     (first segment → map / deny / `*` / bare name)
//!     → resolver.rs (express fallback, descriptor, root rewrite)
//!     → Return: Dispatch(AppDescriptor) | PassThrough | AppNotFound
//! ```
//!
//! # Design Decisions
//! - Stages run strictly in order; the first to name an app wins
//! - Tables compiled from config, immutable until the next reload
//! - All per-request state lives in a [`ResolutionContext`]

pub mod context;
pub mod descriptor;
pub mod domain;
pub mod error;
pub mod path;
pub mod resolver;
pub mod script;

/// Reserved key matching any domain or any path segment.
pub const WILDCARD: &str = "*";

pub use context::{BindingMode, DispatchRequest, RequestTarget, ResolutionContext};
pub use descriptor::AppDescriptor;
pub use domain::{DomainBindingTable, DomainMatch, DomainMatchKind};
pub use error::DispatchError;
pub use path::{AppMapping, AppNameResolver, AppView, DenyList, PathMappingTable};
pub use resolver::{DispatchSettings, Dispatcher, Resolution};
