//! Application resource loading.
//!
//! # Data Flow
//! ```text
//! AppDescriptor (exists)
//!     → common.<ext>        bootstrap, once per process per path
//!     → config/*.<ext>      one config entry per file stem
//!     → event.<ext>         event bindings
//!     → middleware.<ext>    merged into the `app` middleware group
//!     → provider.<ext>      service provider bindings
//!     → lang/<locale>.<ext> default language pack
//!     → AppEnvironment
//! ```
//!
//! # Design Decisions
//! - File formats live behind [`ResourceLoader`]; this module only checks
//!   existence and orchestrates
//! - Missing optional files are skipped, unreadable ones are errors

pub mod environment;
pub mod fs;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dispatch::{AppDescriptor, DispatchSettings};

pub use environment::AppEnvironment;
pub use fs::FsResourceLoader;

/// Errors raised while reading an app resource file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Event bindings declared by an app.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EventBindings {
    /// Event alias to event name.
    pub bind: BTreeMap<String, String>,
    /// Event name to listeners, in registration order.
    pub listen: BTreeMap<String, Vec<String>>,
    /// Subscribers registered for every event they declare.
    pub subscribe: Vec<String>,
}

/// Middleware declared by an app, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MiddlewareList {
    pub middleware: Vec<String>,
}

/// Service name to implementation.
pub type ProviderBindings = BTreeMap<String, String>;

/// Message key to translated text.
pub type LangPack = BTreeMap<String, String>;

/// Reads app resource files. Implementations own the file format.
pub trait ResourceLoader: Send + Sync {
    /// Run the app bootstrap file and return the globals it defines.
    fn bootstrap(&self, path: &Path) -> Result<toml::Table, LoadError>;

    /// Every `*.<ext>` file of `dir`, keyed by file stem.
    fn load_config(&self, dir: &Path, ext: &str) -> Result<BTreeMap<String, toml::Value>, LoadError>;

    fn load_events(&self, path: &Path) -> Result<EventBindings, LoadError>;

    fn load_middleware(&self, path: &Path) -> Result<MiddlewareList, LoadError>;

    fn load_providers(&self, path: &Path) -> Result<ProviderBindings, LoadError>;

    fn load_lang(&self, path: &Path) -> Result<LangPack, LoadError>;
}

/// Builds an [`AppEnvironment`] from a finalized descriptor.
pub struct ApplicationLoader {
    resources: Arc<dyn ResourceLoader>,
    /// Bootstrap files already run in this process.
    bootstrapped: DashMap<PathBuf, Arc<toml::Table>>,
}

impl ApplicationLoader {
    pub fn new(resources: Arc<dyn ResourceLoader>) -> Self {
        Self {
            resources,
            bootstrapped: DashMap::new(),
        }
    }

    /// Number of distinct bootstrap files run so far.
    pub fn bootstrapped_count(&self) -> usize {
        self.bootstrapped.len()
    }

    /// Load every resource of `app`. Apps without a directory get an empty
    /// environment carrying only the descriptor.
    pub fn load(&self, settings: &DispatchSettings, app: AppDescriptor) -> Result<AppEnvironment, LoadError> {
        let mut env = AppEnvironment::new(app, &settings.default_lang);
        if !env.app.exists {
            return Ok(env);
        }

        let ext = settings.config_ext.as_str();
        let base = env.app.path.clone();
        let file = |stem: &str| base.join(format!("{stem}.{ext}"));

        let common = file("common");
        if common.is_file() {
            let globals = self
                .bootstrapped
                .entry(common.clone())
                .or_try_insert_with(|| self.resources.bootstrap(&common).map(Arc::new))?
                .clone();
            env.globals = toml::Table::clone(&globals);
        }

        let config = self.resources.load_config(&base.join("config"), ext)?;
        env.register_config(config);

        let events = file("event");
        if events.is_file() {
            env.load_events(self.resources.load_events(&events)?);
        }

        let middleware = file("middleware");
        if middleware.is_file() {
            env.import_middleware(self.resources.load_middleware(&middleware)?);
        }

        let providers = file("provider");
        if providers.is_file() {
            env.bind_providers(self.resources.load_providers(&providers)?);
        }

        let lang = base.join("lang").join(format!("{}.{ext}", settings.default_lang));
        if lang.is_file() {
            env.load_lang_pack(self.resources.load_lang(&lang)?);
        }

        tracing::debug!(
            app = %env.app.name,
            configs = env.config.len(),
            middleware = env.middleware.len(),
            "App resources loaded"
        );
        Ok(env)
    }
}
