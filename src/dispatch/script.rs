//! Entry point and explicit binding inspection.
//!
//! A deployment is pinned to one app either by an explicit bind setting or by
//! serving it through a dedicated front controller (`admin.php` serves
//! `admin`). The generic controllers in [`RESERVED_ENTRIES`] leave the choice
//! to the domain and path stages.

use std::path::Path;

/// Entry-point names that never select an app by themselves.
pub const RESERVED_ENTRIES: [&str; 3] = ["index", "router", "think"];

/// Returns the pinned app name, or `None` when later stages must decide.
pub fn inspect(explicit_name: Option<&str>, entry: &str) -> Option<String> {
    if let Some(name) = explicit_name.filter(|n| !n.is_empty()) {
        return Some(name.to_string());
    }
    if !entry.is_empty() && !RESERVED_ENTRIES.contains(&entry) {
        return Some(entry.to_string());
    }
    None
}

/// Entry identifier of a front controller path: its file stem.
pub fn entry_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string()
}
