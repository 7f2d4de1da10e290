//! Resolution pipeline and the hot-swappable dispatcher.
//!
//! # Responsibilities
//! - Compile `[app]` configuration into immutable [`DispatchSettings`]
//! - Run inspector → domain → path → express fallback for one request
//! - Hand finalized descriptors to the application loader
//! - Swap settings atomically on reload
//!
//! # Design Decisions
//! - Each resolution works on one settings snapshot from start to finish
//! - Express fallback only applies to names taken straight from the path;
//!   bound and mapped names are used even if their directory is missing
//! - "No app" is a value ([`Resolution::PassThrough`]), not an error

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;

use crate::config::AppConfig;
use crate::dispatch::context::{BindingMode, DispatchRequest, ResolutionContext};
use crate::dispatch::descriptor::AppDescriptor;
use crate::dispatch::domain::DomainBindingTable;
use crate::dispatch::error::DispatchError;
use crate::dispatch::path::{self, AppNameResolver, AppView, DenyList, PathMappingTable, PathOutcome};
use crate::dispatch::script;
use crate::loader::{AppEnvironment, ApplicationLoader, FsResourceLoader, ResourceLoader};
use crate::observability::metrics;

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// An app was selected.
    Dispatch(AppDescriptor),
    /// No app applies; the request continues without multi-app handling.
    PassThrough,
}

/// Immutable, compiled view of the `[app]` table.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub default_app: String,
    pub domains: DomainBindingTable,
    pub paths: PathMappingTable,
    pub deny: DenyList,
    pub express: bool,
    pub namespace: Option<String>,
    pub config_ext: String,
    pub base_path: PathBuf,
    pub runtime_path: PathBuf,
    pub default_lang: String,
    pub explicit_name: Option<String>,
    pub explicit_path: Option<PathBuf>,
    pub entry: String,
    pub domain_root: Option<String>,
}

impl DispatchSettings {
    /// Compile configuration plus programmatically registered resolvers.
    pub fn compile(app: &AppConfig, computed: &BTreeMap<String, Arc<dyn AppNameResolver>>) -> Self {
        let mut paths = PathMappingTable::new(app.app_map.clone());
        for (segment, resolver) in computed {
            paths.insert_computed(segment.clone(), resolver.clone());
        }

        let default_app = if app.default_app.is_empty() {
            "index".to_string()
        } else {
            app.default_app.clone()
        };

        Self {
            default_app,
            domains: DomainBindingTable::new(app.domain_bind.iter()),
            paths,
            deny: DenyList::new(app.deny_app_list.iter().cloned()),
            express: app.app_express,
            namespace: app.app_namespace.clone().filter(|ns| !ns.is_empty()),
            config_ext: app.config_ext.trim_start_matches('.').to_string(),
            base_path: app.base_path.clone(),
            runtime_path: app.runtime_path.clone(),
            default_lang: app.default_lang.clone(),
            explicit_name: app.bind.clone(),
            explicit_path: app.bind_path.clone(),
            entry: script::entry_from_path(Path::new(&app.entry)),
            domain_root: app.domain_root.clone(),
        }
    }

    /// A fresh context for one request.
    pub fn context(&self) -> ResolutionContext {
        ResolutionContext::new()
            .with_explicit_name(self.explicit_name.clone())
            .with_explicit_path(self.explicit_path.clone())
            .with_entry(self.entry.clone())
    }

    /// Resolve the app for `req`, rewriting its root and path info when the
    /// first segment is consumed.
    ///
    /// Re-entry on an already finalized context returns the same descriptor
    /// and leaves the request untouched.
    pub fn resolve<R: DispatchRequest + ?Sized>(
        &self,
        ctx: &mut ResolutionContext,
        req: &mut R,
    ) -> Result<Resolution, DispatchError> {
        if let Some(done) = ctx.resolved() {
            return Ok(Resolution::Dispatch(done.clone()));
        }
        if let Some(root) = &self.domain_root {
            req.set_domain_root(root);
        }

        let Some(name) = self.select(ctx, req)? else {
            return Ok(Resolution::PassThrough);
        };

        let descriptor = self.describe(&name, ctx);
        tracing::debug!(
            app = %descriptor.name,
            path = %descriptor.path.display(),
            bound = descriptor.bound,
            "App resolved"
        );
        ctx.finalize(descriptor.clone());
        Ok(Resolution::Dispatch(descriptor))
    }

    fn select<R: DispatchRequest + ?Sized>(
        &self,
        ctx: &mut ResolutionContext,
        req: &mut R,
    ) -> Result<Option<String>, DispatchError> {
        if let Some(name) = script::inspect(ctx.explicit_name(), ctx.entry()) {
            ctx.set_binding(BindingMode::Explicit);
            return Ok(Some(self.or_default(name)));
        }
        ctx.set_binding(BindingMode::Undetermined);

        if let Some(hit) = self.domains.match_request(req) {
            tracing::debug!(app = %hit.app, kind = ?hit.kind, "Domain binding matched");
            ctx.set_binding(BindingMode::Explicit);
            return Ok(Some(self.or_default(hit.app.to_string())));
        }
        ctx.set_binding(BindingMode::Inferred);

        let path_info = req.path_info().to_string();
        let segment = path::app_segment(&path_info);
        let sub_domain = req.sub_domain();
        let view = AppView {
            host: req.host(true),
            sub_domain: &sub_domain,
            path_info: &path_info,
            segment: &segment,
            default_app: &self.default_app,
        };

        let outcome = path::map_segment(&segment, &view, &self.paths, &self.deny)?;
        let candidate = match &outcome {
            PathOutcome::Mapped(name) | PathOutcome::Direct(name) => name,
        };
        if !path::is_app_name(candidate) {
            tracing::debug!(app = %candidate, "Not a valid app directory name, passing through");
            return Ok(None);
        }

        let name = match outcome {
            PathOutcome::Mapped(name) => name,
            PathOutcome::Direct(name) => {
                let dir = self.app_path(ctx, &name);
                if !dir.is_dir() {
                    if self.express {
                        tracing::debug!(
                            app = %name,
                            fallback = %self.default_app,
                            "App directory missing, using default app"
                        );
                        return Ok(Some(self.default_app.clone()));
                    }
                    tracing::debug!(app = %name, dir = %dir.display(), "App directory missing");
                    return Ok(None);
                }
                name
            }
        };

        if !segment.is_empty() {
            req.set_root(format!("/{segment}"));
            req.set_pathinfo(path::remainder(&path_info).to_string());
        }

        Ok(Some(self.or_default(name)))
    }

    fn or_default(&self, name: String) -> String {
        if name.is_empty() {
            self.default_app.clone()
        } else {
            name
        }
    }

    fn app_path(&self, ctx: &ResolutionContext, name: &str) -> PathBuf {
        match ctx.explicit_path() {
            Some(path) => path.to_path_buf(),
            None => self.base_path.join(name),
        }
    }

    fn describe(&self, name: &str, ctx: &ResolutionContext) -> AppDescriptor {
        let path = self.app_path(ctx, name);
        let exists = path.is_dir();
        let namespace = self
            .namespace
            .clone()
            .unwrap_or_else(|| format!("app::{name}"));
        let (runtime_path, route_path) = if exists {
            (self.runtime_path.join(name), Some(path.join("route")))
        } else {
            (self.runtime_path.clone(), None)
        };

        AppDescriptor {
            name: name.to_string(),
            path,
            namespace,
            runtime_path,
            route_path,
            bound: ctx.binding() == BindingMode::Explicit,
            exists,
        }
    }
}

/// Resolves requests against hot-swappable settings and loads the selected app.
pub struct Dispatcher {
    settings: ArcSwap<DispatchSettings>,
    computed: BTreeMap<String, Arc<dyn AppNameResolver>>,
    loader: ApplicationLoader,
}

impl Dispatcher {
    /// Create a dispatcher that reads app resources as TOML from disk.
    pub fn new(app: &AppConfig) -> Self {
        Self::with_loader(app, Arc::new(FsResourceLoader))
    }

    pub fn with_loader(app: &AppConfig, resources: Arc<dyn ResourceLoader>) -> Self {
        let computed = BTreeMap::new();
        Self {
            settings: ArcSwap::from_pointee(DispatchSettings::compile(app, &computed)),
            computed,
            loader: ApplicationLoader::new(resources),
        }
    }

    /// Register a closure as the computed mapping for `segment`.
    pub fn with_resolver<F>(self, segment: impl Into<String>, resolver: F) -> Self
    where
        F: Fn(&AppView<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.with_mapping(segment, Arc::new(resolver))
    }

    /// Register a computed mapping for `segment`. It survives reloads.
    pub fn with_mapping(mut self, segment: impl Into<String>, resolver: Arc<dyn AppNameResolver>) -> Self {
        let segment = segment.into();

        let mut settings = DispatchSettings::clone(&self.settings.load());
        settings.paths.insert_computed(segment.clone(), resolver.clone());
        self.settings.store(Arc::new(settings));

        self.computed.insert(segment, resolver);
        self
    }

    /// Current settings snapshot.
    pub fn settings(&self) -> Arc<DispatchSettings> {
        self.settings.load_full()
    }

    /// Replace the settings with a freshly compiled snapshot.
    pub fn reload(&self, app: &AppConfig) {
        self.settings
            .store(Arc::new(DispatchSettings::compile(app, &self.computed)));
        tracing::info!(default_app = %app.default_app, "Dispatch settings reloaded");
    }

    /// Resolve with an explicit context (stages 1–4 only).
    pub fn resolve<R: DispatchRequest + ?Sized>(
        &self,
        ctx: &mut ResolutionContext,
        req: &mut R,
    ) -> Result<Resolution, DispatchError> {
        self.settings.load().resolve(ctx, req)
    }

    /// Resolve `req` from a fresh context and load the selected app.
    ///
    /// `Ok(None)` means the request should pass through untouched.
    pub fn dispatch<R: DispatchRequest + ?Sized>(
        &self,
        req: &mut R,
    ) -> Result<Option<AppEnvironment>, DispatchError> {
        let start = Instant::now();
        let settings = self.settings.load_full();
        let mut ctx = settings.context();

        let outcome = settings
            .resolve(&mut ctx, req)
            .and_then(|resolution| match resolution {
                Resolution::Dispatch(app) => self
                    .loader
                    .load(&settings, app)
                    .map(Some)
                    .map_err(DispatchError::from),
                Resolution::PassThrough => Ok(None),
            });

        match &outcome {
            Ok(Some(env)) => metrics::record_resolution("dispatched", &env.app.name, start),
            Ok(None) => metrics::record_resolution("pass_through", "", start),
            Err(DispatchError::AppNotFound(name)) => {
                tracing::info!(app = %name, "Rejected direct app request");
                metrics::record_resolution("rejected", name, start)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load app");
                metrics::record_resolution("load_failed", "", start)
            }
        }

        outcome
    }
}
