//! First-segment app mapping.
//!
//! # Responsibilities
//! - Extract the app segment from the request path
//! - Resolve it through the mapping table (literal or computed entries)
//! - Reject direct requests for mapping targets and denied apps
//! - Fall back to the `*` entry, then to the bare segment
//! - Only plain directory names ever become apps
//!
//! # Design Decisions
//! - Computed entries only see an [`AppView`], never the dispatcher itself
//! - A segment that is the *target* of some mapping is rejected even when it
//!   is a real app; callers must reach it through its mapped key

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Component, Path};
use std::sync::Arc;

use percent_encoding::percent_decode_str;

use crate::dispatch::error::DispatchError;
use crate::dispatch::WILDCARD;

/// Read-only request facts handed to computed mappings.
#[derive(Debug, Clone, Copy)]
pub struct AppView<'a> {
    pub host: &'a str,
    pub sub_domain: &'a str,
    pub path_info: &'a str,
    pub segment: &'a str,
    pub default_app: &'a str,
}

/// Computes an app name for a mapped segment.
///
/// Returning `None` or an empty name falls back to the segment itself.
pub trait AppNameResolver: Send + Sync {
    fn resolve(&self, view: &AppView<'_>) -> Option<String>;
}

impl<F> AppNameResolver for F
where
    F: Fn(&AppView<'_>) -> Option<String> + Send + Sync,
{
    fn resolve(&self, view: &AppView<'_>) -> Option<String> {
        self(view)
    }
}

/// A mapping table value.
#[derive(Clone)]
pub enum AppMapping {
    Literal(String),
    Computed(Arc<dyn AppNameResolver>),
}

impl AppMapping {
    /// Resolve to a name, using `fallback` when a computed entry yields nothing.
    pub fn resolve(&self, view: &AppView<'_>, fallback: &str) -> String {
        match self {
            AppMapping::Literal(name) => name.clone(),
            AppMapping::Computed(resolver) => resolver
                .resolve(view)
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| fallback.to_string()),
        }
    }
}

impl fmt::Debug for AppMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppMapping::Literal(name) => f.debug_tuple("Literal").field(name).finish(),
            AppMapping::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// First path segment to app mapping.
#[derive(Debug, Clone, Default)]
pub struct PathMappingTable {
    entries: BTreeMap<String, AppMapping>,
}

impl PathMappingTable {
    /// Build a table of literal entries.
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), AppMapping::Literal(v.into())))
                .collect(),
        }
    }

    pub fn insert_computed(&mut self, segment: impl Into<String>, resolver: Arc<dyn AppNameResolver>) {
        self.entries
            .insert(segment.into(), AppMapping::Computed(resolver));
    }

    pub fn get(&self, segment: &str) -> Option<&AppMapping> {
        self.entries.get(segment)
    }

    /// True when `name` is the literal target of any entry.
    pub fn maps_to(&self, name: &str) -> bool {
        self.entries
            .values()
            .any(|m| matches!(m, AppMapping::Literal(target) if target == name))
    }

    pub fn wildcard(&self) -> Option<&AppMapping> {
        self.entries.get(WILDCARD)
    }
}

/// App names that can never be selected by path.
#[derive(Debug, Clone, Default)]
pub struct DenyList(BTreeSet<String>);

impl DenyList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }
}

/// How the path stage arrived at a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathOutcome {
    /// Taken from the mapping table or its wildcard entry.
    Mapped(String),
    /// The bare segment (or the default app); its directory must exist.
    Direct(String),
}

/// The app segment of a raw `path_info`: the first component,
/// percent-decoded, then cut at the first `.` past position zero.
pub fn app_segment(path_info: &str) -> Cow<'_, str> {
    let raw = path_info.split('/').next().unwrap_or_default();
    match percent_decode_str(raw).decode_utf8_lossy() {
        Cow::Borrowed(segment) => Cow::Borrowed(strip_extension(segment)),
        Cow::Owned(segment) => Cow::Owned(strip_extension(&segment).to_string()),
    }
}

fn strip_extension(segment: &str) -> &str {
    match segment.find('.') {
        Some(idx) if idx > 0 => &segment[..idx],
        _ => segment,
    }
}

/// True when `name` is a single plain directory name (no `.`, `..` or
/// separators), so joining it to the app root stays below that root.
pub fn is_app_name(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// What the inner app sees once the first segment is consumed.
///
/// Computed on the raw path, so `api.v2/users` leaves `users`.
pub fn remainder(path_info: &str) -> &str {
    match path_info.find('/') {
        Some(idx) if idx > 0 => path_info[idx..].trim_start_matches('/'),
        _ => "",
    }
}

/// Apply the mapping rules to a segment.
pub fn map_segment(
    segment: &str,
    view: &AppView<'_>,
    table: &PathMappingTable,
    deny: &DenyList,
) -> Result<PathOutcome, DispatchError> {
    if let Some(mapping) = table.get(segment) {
        return Ok(PathOutcome::Mapped(mapping.resolve(view, segment)));
    }

    if !segment.is_empty() && (table.maps_to(segment) || deny.contains(segment)) {
        return Err(DispatchError::AppNotFound(segment.to_string()));
    }

    if !segment.is_empty() {
        if let Some(mapping) = table.wildcard() {
            return Ok(PathOutcome::Mapped(mapping.resolve(view, segment)));
        }
    }

    if segment.is_empty() {
        Ok(PathOutcome::Direct(view.default_app.to_string()))
    } else {
        Ok(PathOutcome::Direct(segment.to_string()))
    }
}
