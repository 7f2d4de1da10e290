//! Shared fixtures for integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use app_dispatcher::config::AppConfig;
use tempfile::TempDir;

/// A temporary deployment with one directory per app.
pub struct AppTree {
    dir: TempDir,
}

#[allow(dead_code)]
impl AppTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn apps_dir(&self) -> PathBuf {
        self.dir.path().join("app")
    }

    /// Create an empty app directory.
    pub fn app(self, name: &str) -> Self {
        fs::create_dir_all(self.apps_dir().join(name)).unwrap();
        self
    }

    /// Write `content` to `app/<relative>`, creating parents.
    pub fn file(self, relative: &str, content: &str) -> Self {
        let path = self.apps_dir().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
        self
    }

    /// App settings pointing at this tree.
    pub fn config(&self) -> AppConfig {
        AppConfig {
            base_path: self.apps_dir(),
            runtime_path: self.dir.path().join("runtime"),
            ..AppConfig::default()
        }
    }
}
