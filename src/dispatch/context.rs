//! Request-scoped resolution state and the request boundary.

use std::path::{Path, PathBuf};

use crate::dispatch::descriptor::AppDescriptor;

/// The view of an HTTP request the resolver reads and rewrites.
///
/// `path_info` never carries a leading `/`. `set_root` and `set_pathinfo`
/// are called together once the first path segment has been consumed.
pub trait DispatchRequest {
    /// Path below the current root, without leading slash.
    fn path_info(&self) -> &str;

    /// Request host, optionally without the `:port` suffix.
    fn host(&self, strip_port: bool) -> &str;

    /// Host labels in front of the root domain, empty if none.
    fn sub_domain(&self) -> String;

    /// Root prefix consumed so far (`""` or `/<segment>`).
    fn root(&self) -> &str;

    fn set_root(&mut self, root: String);

    fn set_pathinfo(&mut self, path_info: String);

    /// Measure sub-domains against `root` instead of the last two host
    /// labels. Requests that derive their own sub-domain ignore it.
    fn set_domain_root(&mut self, _root: &str) {}
}

/// Plain request state used by the HTTP middleware and by tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestTarget {
    host: String,
    path_info: String,
    root: String,
    domain_root: Option<String>,
}

impl RequestTarget {
    /// Build a target from a raw host header and URI path.
    pub fn new(host: impl Into<String>, path: &str) -> Self {
        Self {
            host: host.into().to_ascii_lowercase(),
            path_info: path.trim_start_matches('/').to_string(),
            root: String::new(),
            domain_root: None,
        }
    }

    /// The root domain sub-domains are measured against.
    pub fn root_domain(&self) -> String {
        if let Some(root) = &self.domain_root {
            return root.clone();
        }
        let labels: Vec<&str> = self.host(true).split('.').collect();
        match labels.as_slice() {
            [.., second, last] => format!("{second}.{last}"),
            [only] => (*only).to_string(),
            [] => String::new(),
        }
    }
}

impl DispatchRequest for RequestTarget {
    fn path_info(&self) -> &str {
        &self.path_info
    }

    fn host(&self, strip_port: bool) -> &str {
        if strip_port {
            strip_host_port(&self.host)
        } else {
            &self.host
        }
    }

    fn sub_domain(&self) -> String {
        let root = self.root_domain();
        if root.is_empty() {
            return String::new();
        }
        let host = self.host(true);
        match host.find(&root) {
            Some(idx) => host[..idx].trim_end_matches('.').to_string(),
            None => String::new(),
        }
    }

    fn root(&self) -> &str {
        &self.root
    }

    fn set_root(&mut self, root: String) {
        self.root = root;
    }

    fn set_pathinfo(&mut self, path_info: String) {
        self.path_info = path_info;
    }

    fn set_domain_root(&mut self, root: &str) {
        self.domain_root = Some(root.to_ascii_lowercase());
    }
}

fn strip_host_port(host: &str) -> &str {
    // [v6]:port
    if let Some(end) = host.strip_prefix('[').and_then(|rest| rest.find(']')) {
        return &host[..end + 2];
    }
    host.split(':').next().unwrap_or(host)
}

/// Whether the app identity is already authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindingMode {
    /// Nothing has been decided yet.
    #[default]
    Undetermined,
    /// Derived from the request path; the inner app still sees the app prefix stripped.
    Inferred,
    /// Pinned by configuration, entry point or domain; later stages must not override it.
    Explicit,
}

/// Mutable state for a single request resolution.
///
/// A fresh context is built for every request; nothing here outlives it.
#[derive(Debug, Clone, Default)]
pub struct ResolutionContext {
    explicit_name: Option<String>,
    explicit_path: Option<PathBuf>,
    entry: String,
    binding: BindingMode,
    resolved: Option<AppDescriptor>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_explicit_name(mut self, name: Option<String>) -> Self {
        self.explicit_name = name.filter(|n| !n.is_empty());
        self
    }

    pub fn with_explicit_path(mut self, path: Option<PathBuf>) -> Self {
        self.explicit_path = path;
        self
    }

    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = entry.into();
        self
    }

    pub fn explicit_name(&self) -> Option<&str> {
        self.explicit_name.as_deref()
    }

    pub fn explicit_path(&self) -> Option<&Path> {
        self.explicit_path.as_deref()
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn binding(&self) -> BindingMode {
        self.binding
    }

    pub(crate) fn set_binding(&mut self, mode: BindingMode) {
        self.binding = mode;
    }

    /// True once the app name must not be re-derived for this request.
    pub fn is_bound(&self) -> bool {
        self.binding == BindingMode::Explicit || self.resolved.is_some()
    }

    /// The descriptor finalized by a previous resolution, if any.
    pub fn resolved(&self) -> Option<&AppDescriptor> {
        self.resolved.as_ref()
    }

    pub(crate) fn finalize(&mut self, descriptor: AppDescriptor) {
        self.resolved = Some(descriptor);
    }
}
