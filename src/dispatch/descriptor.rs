//! The finalized output of a resolution.

use std::path::PathBuf;

use serde::Serialize;

/// Everything the loader and the inner application need to know about the
/// app selected for a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppDescriptor {
    /// App name bound into the request context.
    pub name: String,

    /// App base directory.
    pub path: PathBuf,

    /// Namespace handlers of this app live under.
    pub namespace: String,

    /// Runtime/cache directory, extended with the app name when the app exists.
    pub runtime_path: PathBuf,

    /// Route lookup directory, only set when the app directory exists.
    pub route_path: Option<PathBuf>,

    /// The app was pinned (entry point, bind setting or domain) rather than
    /// inferred from the path.
    pub bound: bool,

    /// Whether `path` existed when the descriptor was built.
    pub exists: bool,
}
