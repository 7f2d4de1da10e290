//! TOML resource files on the local filesystem.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::loader::{EventBindings, LangPack, LoadError, MiddlewareList, ProviderBindings, ResourceLoader};

/// Reads app resources as TOML documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsResourceLoader;

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl ResourceLoader for FsResourceLoader {
    fn bootstrap(&self, path: &Path) -> Result<toml::Table, LoadError> {
        read_toml(path)
    }

    fn load_config(&self, dir: &Path, ext: &str) -> Result<BTreeMap<String, toml::Value>, LoadError> {
        let mut configs = BTreeMap::new();
        if !dir.is_dir() {
            return Ok(configs);
        }

        let entries = fs::read_dir(dir).map_err(|source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        for entry in entries {
            let path = entry
                .map_err(|source| LoadError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?
                .path();

            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(ext) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let table: toml::Table = read_toml(&path)?;
            configs.insert(name.to_string(), toml::Value::Table(table));
        }

        Ok(configs)
    }

    fn load_events(&self, path: &Path) -> Result<EventBindings, LoadError> {
        read_toml(path)
    }

    fn load_middleware(&self, path: &Path) -> Result<MiddlewareList, LoadError> {
        read_toml(path)
    }

    fn load_providers(&self, path: &Path) -> Result<ProviderBindings, LoadError> {
        read_toml(path)
    }

    fn load_lang(&self, path: &Path) -> Result<LangPack, LoadError> {
        read_toml(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_files_keyed_by_stem() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("database.toml"), "host = \"db\"\nport = 3306\n").unwrap();
        fs::write(dir.path().join("cache.toml"), "driver = \"file\"\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(dir.path().join("nested.toml")).unwrap();

        let configs = FsResourceLoader.load_config(dir.path(), "toml").unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs["database"]["port"].as_integer(), Some(3306));
        assert_eq!(configs["cache"]["driver"].as_str(), Some("file"));
    }

    #[test]
    fn test_missing_config_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let configs = FsResourceLoader.load_config(&dir.path().join("config"), "toml").unwrap();
        assert!(configs.is_empty());
    }

    #[test]
    fn test_event_file_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.toml");
        fs::write(
            &path,
            "subscribe = [\"audit\"]\n[listen]\nUserLogin = [\"notify\", \"stats\"]\n",
        )
        .unwrap();

        let events = FsResourceLoader.load_events(&path).unwrap();
        assert_eq!(events.subscribe, vec!["audit".to_string()]);
        assert_eq!(events.listen["UserLogin"], vec!["notify".to_string(), "stats".to_string()]);
        assert!(events.bind.is_empty());
    }

    #[test]
    fn test_unreadable_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("provider.toml");
        fs::write(&path, "cache = 1\n").unwrap();

        let err = FsResourceLoader.load_providers(&path).unwrap_err();
        assert!(err.to_string().contains("provider.toml"));
    }
}
