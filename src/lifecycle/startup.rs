//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration, applying command-line overrides
//! - Keep the dispatcher in sync with reloaded configuration
//!
//! # Design Decisions
//! - Fail fast: a bad config at startup is fatal
//! - Overrides are re-applied to every reloaded config

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::{load_config, ConfigError, DispatcherConfig};
use crate::dispatch::Dispatcher;
use crate::lifecycle::shutdown::Shutdown;
use crate::observability::metrics;

/// Values given on the command line that win over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub entry: Option<String>,
}

impl Overrides {
    pub fn apply(&self, config: &mut DispatcherConfig) {
        if let Some(entry) = &self.entry {
            config.app.entry = entry.clone();
        }
    }
}

/// Load the startup configuration, or defaults when no file is given.
pub fn load_startup_config(path: Option<&Path>, overrides: &Overrides) -> Result<DispatcherConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => DispatcherConfig::default(),
    };
    overrides.apply(&mut config);
    Ok(config)
}

/// Feed reloaded configurations into the dispatcher until shutdown.
pub fn spawn_config_reloader(
    dispatcher: Arc<Dispatcher>,
    mut updates: mpsc::UnboundedReceiver<DispatcherConfig>,
    overrides: Overrides,
    shutdown: &Shutdown,
) -> JoinHandle<()> {
    let mut stop = shutdown.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                update = updates.recv() => match update {
                    Some(mut config) => {
                        overrides.apply(&mut config);
                        dispatcher.reload(&config.app);
                        metrics::record_config_reload(true);
                    }
                    None => break,
                },
                _ = stop.recv() => break,
            }
        }
        tracing::debug!("Config reloader stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply_to_defaults() {
        let overrides = Overrides {
            entry: Some("admin".into()),
        };
        let config = load_startup_config(None, &overrides).unwrap();
        assert_eq!(config.app.entry, "admin");
    }

    #[tokio::test]
    async fn test_reloader_swaps_settings() {
        let config = DispatcherConfig::default();
        let dispatcher = Arc::new(Dispatcher::new(&config.app));
        let shutdown = Shutdown::new();
        let (tx, rx) = mpsc::unbounded_channel();

        let overrides = Overrides {
            entry: Some("shop".into()),
        };
        let handle = spawn_config_reloader(dispatcher.clone(), rx, overrides, &shutdown);

        let mut next = DispatcherConfig::default();
        next.app.default_app = "home".into();
        tx.send(next).unwrap();
        drop(tx);
        handle.await.unwrap();

        let settings = dispatcher.settings();
        assert_eq!(settings.default_app, "home");
        assert_eq!(settings.entry, "shop");
    }
}
