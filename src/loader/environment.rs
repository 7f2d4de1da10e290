//! Per-request application environment.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::dispatch::AppDescriptor;
use crate::loader::{EventBindings, LangPack, MiddlewareList, ProviderBindings};

/// The app selected for a request and every resource loaded for it.
///
/// Built fresh per request and handed to the inner application through the
/// request extensions.
#[derive(Debug, Clone, Serialize)]
pub struct AppEnvironment {
    pub app: AppDescriptor,
    /// Values defined by the bootstrap file.
    pub globals: toml::Table,
    /// Config name (file stem) to document.
    pub config: BTreeMap<String, toml::Value>,
    pub events: EventBindings,
    /// The `app` middleware group.
    pub middleware: Vec<String>,
    pub providers: ProviderBindings,
    pub locale: String,
    pub lang: LangPack,
}

impl AppEnvironment {
    pub fn new(app: AppDescriptor, locale: &str) -> Self {
        Self {
            app,
            globals: toml::Table::new(),
            config: BTreeMap::new(),
            events: EventBindings::default(),
            middleware: Vec::new(),
            providers: ProviderBindings::new(),
            locale: locale.to_string(),
            lang: LangPack::new(),
        }
    }

    pub fn register_config(&mut self, configs: BTreeMap<String, toml::Value>) {
        self.config.extend(configs);
    }

    /// Look up `name` or a dotted path into it (`database.host`).
    pub fn config(&self, key: &str) -> Option<&toml::Value> {
        let mut parts = key.split('.');
        let mut value = self.config.get(parts.next()?)?;
        for part in parts {
            value = value.get(part)?;
        }
        Some(value)
    }

    pub fn load_events(&mut self, events: EventBindings) {
        self.events.bind.extend(events.bind);
        for (event, listeners) in events.listen {
            self.events.listen.entry(event).or_default().extend(listeners);
        }
        self.events.subscribe.extend(events.subscribe);
    }

    pub fn import_middleware(&mut self, list: MiddlewareList) {
        self.middleware.extend(list.middleware);
    }

    pub fn bind_providers(&mut self, providers: ProviderBindings) {
        self.providers.extend(providers);
    }

    pub fn load_lang_pack(&mut self, pack: LangPack) {
        self.lang.extend(pack);
    }

    /// Translated text for `key`, or the key itself.
    pub fn translate<'a>(&'a self, key: &'a str) -> &'a str {
        self.lang.get(key).map(String::as_str).unwrap_or(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn env() -> AppEnvironment {
        let app = AppDescriptor {
            name: "shop".into(),
            path: PathBuf::from("app/shop"),
            namespace: "app::shop".into(),
            runtime_path: PathBuf::from("runtime/shop"),
            route_path: Some(PathBuf::from("app/shop/route")),
            bound: false,
            exists: true,
        };
        AppEnvironment::new(app, "en-us")
    }

    #[test]
    fn test_dotted_config_lookup() {
        let mut env = env();
        let db = toml::Value::Table(
            toml::from_str("host = \"db\"\n[pool]\nmax = 8\n").unwrap(),
        );
        env.register_config(BTreeMap::from([("database".to_string(), db)]));

        assert_eq!(env.config("database.host").and_then(|v| v.as_str()), Some("db"));
        assert_eq!(env.config("database.pool.max").and_then(|v| v.as_integer()), Some(8));
        assert!(env.config("database.user").is_none());
        assert!(env.config("cache").is_none());
    }

    #[test]
    fn test_event_listeners_merge() {
        let mut env = env();
        let first = EventBindings {
            listen: BTreeMap::from([("Login".to_string(), vec!["a".to_string()])]),
            ..EventBindings::default()
        };
        let second = EventBindings {
            listen: BTreeMap::from([("Login".to_string(), vec!["b".to_string()])]),
            ..EventBindings::default()
        };
        env.load_events(first);
        env.load_events(second);
        assert_eq!(env.events.listen["Login"], vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_translate_falls_back_to_key() {
        let mut env = env();
        env.load_lang_pack(LangPack::from([("hello".to_string(), "Hello".to_string())]));
        assert_eq!(env.translate("hello"), "Hello");
        assert_eq!(env.translate("bye"), "bye");
    }
}
