//! Shared tracker state: collaborators, scan cache and access guard.
//!
//! This is the single coordination point both entry points go through to obtain
//! an aggregation. Stores and registries are blocking; scans run on the blocking
//! pool so request futures stay responsive.

use crate::access::AccessGuard;
use crate::cache::{ScanCache, ScanKey, ScanResult};
use crate::config::TrackerConfig;
use crate::presentation::{EditLinkTemplate, PresentationResolver, StorePresentation};
use crate::registry::{ManifestRegistry, ModuleMap, RegistryProvider, registry_fingerprint};
use crate::scan::{MatchMode, OccurrenceScanner, UsageIndex};
use crate::store::{DirectoryStore, DocumentStore};
use futures::FutureExt;
use std::sync::Arc;

pub struct TrackerState {
    /// Document corpus (read-only)
    store: Arc<dyn DocumentStore>,

    /// Source of module identifiers
    registry: Arc<dyn RegistryProvider>,

    /// Titles and edit links for detail listings
    presentation: Arc<dyn PresentationResolver>,

    match_mode: MatchMode,

    /// Shared scan cache; `None` rescans on every request
    cache: Option<ScanCache>,

    access: AccessGuard,
}

impl std::fmt::Debug for TrackerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerState")
            .field("match_mode", &self.match_mode)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl TrackerState {
    /// Create a state with a store-backed presentation resolver, caching enabled
    /// and a per-process access guard granting the required capability.
    pub fn new(store: Arc<dyn DocumentStore>, registry: Arc<dyn RegistryProvider>) -> Self {
        let presentation = Arc::new(StorePresentation::new(store.clone(), EditLinkTemplate::default()));
        Self {
            store,
            registry,
            presentation,
            match_mode: MatchMode::default(),
            cache: Some(ScanCache::new()),
            access: AccessGuard::ephemeral([crate::access::REQUIRED_CAPABILITY]),
        }
    }

    /// Build the state described by a config: directory store, manifest registry.
    pub fn from_config(config: &TrackerConfig) -> Self {
        let store: Arc<dyn DocumentStore> = Arc::new(DirectoryStore::new(&config.content_dir));
        let registry = Arc::new(ManifestRegistry::new(&config.registry));
        let access = match &config.access.secret {
            Some(secret) => AccessGuard::new(secret, config.access.capabilities.iter().cloned()),
            None => AccessGuard::ephemeral(config.access.capabilities.iter().cloned()),
        };

        tracing::info!(
            "Tracking modules from {} across {}",
            config.registry.display(),
            config.content_dir.display()
        );

        Self::new(store.clone(), registry)
            .with_presentation(Arc::new(StorePresentation::new(
                store,
                EditLinkTemplate::new(config.edit_link.clone()),
            )))
            .with_match_mode(config.match_mode)
            .with_cache(config.cache)
            .with_access(access)
    }

    pub fn with_presentation(mut self, presentation: Arc<dyn PresentationResolver>) -> Self {
        self.presentation = presentation;
        self
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache = enabled.then(ScanCache::new);
        self
    }

    pub fn with_access(mut self, access: AccessGuard) -> Self {
        self.access = access;
        self
    }

    pub fn access(&self) -> &AccessGuard {
        &self.access
    }

    pub fn presentation(&self) -> &Arc<dyn PresentationResolver> {
        &self.presentation
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Compute (or reuse) the aggregation for the current registry and corpus.
    pub async fn aggregate(&self) -> ScanResult {
        let store = self.store.clone();
        let registry = self.registry.clone();
        let cache_enabled = self.cache.is_some();

        // Registry listing and corpus fingerprint are both blocking reads
        let (modules, key) = tokio::task::spawn_blocking(move || {
            let modules = registry.list_modules();
            let key = if cache_enabled {
                match store.fingerprint() {
                    Ok(corpus) => Some(ScanKey {
                        corpus,
                        registry: registry_fingerprint(&modules),
                    }),
                    Err(e) => {
                        tracing::debug!("Corpus fingerprint unavailable, bypassing scan cache: {}", e);
                        None
                    }
                }
            } else {
                None
            };
            (modules, key)
        })
        .await
        .map_err(|e| format!("Registry task failed: {}", e))?;

        match (&self.cache, key) {
            (Some(cache), Some(key)) => {
                let store = self.store.clone();
                let mode = self.match_mode;
                cache
                    .get_or_scan(key, move || run_scan(store, modules, mode).boxed())
                    .await
            }
            _ => run_scan(self.store.clone(), modules, self.match_mode).await,
        }
    }
}

/// Scan `modules` against `store` on the blocking pool.
async fn run_scan(store: Arc<dyn DocumentStore>, modules: ModuleMap, mode: MatchMode) -> ScanResult {
    tokio::task::spawn_blocking(move || {
        let index: UsageIndex = OccurrenceScanner::new(store.as_ref(), mode).scan(modules.keys());
        Arc::new(index)
    })
    .await
    .map_err(|e| format!("Scan task failed: {}", e))
}
