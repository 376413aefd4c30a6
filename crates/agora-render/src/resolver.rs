//! Renderer resolution service
//!
//! Resolves an event type to a loaded renderer, caching loaded renderers in a
//! bounded LRU cache and sharing in-flight loads between concurrent callers.
//!
//! # Resolution
//!
//! ```text
//! resolve(type) ─┬─ cached?      → promote, Loaded (ready immediately)
//!                ├─ in flight?   → join the pending load
//!                ├─ no loader?   → Fallback(UnknownType), not cached
//!                └─ load ─┬─ ok  → cache (evict LRU on overflow), Loaded
//!                         └─ err → Fallback(LoadFailed), not cached
//! ```
//!
//! `resolve` never fails. Failed loads are forgotten so the next call retries.

use crate::config::FeedConfig;
use crate::error::{ConfigError, LoadError};
use crate::registry::{Loader, RendererLoader, RendererRegistry};
use crate::renderer::Renderer;
use futures::future::{self, BoxFuture, FutureExt, Shared};
use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Why a resolution ended at the fallback renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackCause {
    /// No loader registered for the type
    UnknownType,
    /// The loader failed or panicked
    LoadFailed,
}

/// Settled outcome of [`RendererResolver::resolve`]
#[derive(Debug, Clone)]
pub enum Resolution {
    /// A type-specific renderer
    Loaded(Arc<dyn Renderer>),
    /// Use the fallback renderer
    Fallback(FallbackCause),
}

impl Resolution {
    /// True for [`Resolution::Loaded`]
    #[inline]
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, Resolution::Loaded(_))
    }

    /// The loaded renderer, if any
    #[must_use]
    pub fn renderer(&self) -> Option<&Arc<dyn Renderer>> {
        match self {
            Resolution::Loaded(renderer) => Some(renderer),
            Resolution::Fallback(_) => None,
        }
    }
}

/// Counters for cache behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolverStats {
    /// Resolutions served from cache
    pub hits: u64,
    /// Resolutions that joined an in-flight load
    pub joined: u64,
    /// Resolutions that missed both cache and in-flight table
    pub misses: u64,
    /// Loader invocations
    pub loads: u64,
    /// Loader failures (errors and panics)
    pub load_failures: u64,
    /// Entries evicted for capacity
    pub evictions: u64,
    /// Resolutions for types with no loader
    pub unknown: u64,
}

type SharedLoad = Shared<BoxFuture<'static, Resolution>>;

struct ResolverState {
    cache: LruCache<String, Arc<dyn Renderer>>,
    in_flight: HashMap<String, SharedLoad>,
    stats: ResolverStats,
}

/// Bounded, deduplicating renderer resolver
///
/// Cheap to clone; clones share the cache. Construct one per rendering
/// session.
#[derive(Clone)]
pub struct RendererResolver {
    registry: Arc<RendererRegistry>,
    state: Arc<Mutex<ResolverState>>,
}

impl fmt::Debug for RendererResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("RendererResolver")
            .field("capacity", &state.cache.cap())
            .field("cached", &state.cache.len())
            .field("in_flight", &state.in_flight.len())
            .field("stats", &state.stats)
            .finish_non_exhaustive()
    }
}

impl RendererResolver {
    /// Create resolver with cache capacity
    #[must_use]
    pub fn new(registry: RendererRegistry, capacity: NonZeroUsize) -> Self {
        Self {
            registry: Arc::new(registry),
            state: Arc::new(Mutex::new(ResolverState {
                cache: LruCache::new(capacity),
                in_flight: HashMap::new(),
                stats: ResolverStats::default(),
            })),
        }
    }

    /// Create resolver sized by configuration
    ///
    /// # Errors
    /// - `ConfigError::InvalidValue` if `cache_capacity` is zero
    pub fn from_config(registry: RendererRegistry, config: &FeedConfig) -> Result<Self, ConfigError> {
        let capacity = NonZeroUsize::new(config.cache_capacity).ok_or(ConfigError::InvalidValue {
            field: "cache_capacity",
            message: "must be at least 1".to_string(),
        })?;
        Ok(Self::new(registry, capacity))
    }

    /// Resolve a type tag to a renderer
    ///
    /// The returned future never fails. Cache hits are ready immediately;
    /// concurrent calls for a type that is loading share one loader
    /// invocation.
    pub fn resolve(&self, type_key: &str) -> BoxFuture<'static, Resolution> {
        let mut state = self.state.lock();

        if let Some(renderer) = state.cache.get(type_key) {
            let renderer = Arc::clone(renderer);
            state.stats.hits += 1;
            tracing::debug!(type_key, "renderer cache hit");
            return future::ready(Resolution::Loaded(renderer)).boxed();
        }

        if let Some(pending) = state.in_flight.get(type_key) {
            let pending = pending.clone();
            state.stats.joined += 1;
            tracing::debug!(type_key, "joining in-flight renderer load");
            return pending.boxed();
        }

        state.stats.misses += 1;
        let Some(loader) = self.registry.lookup_loader(type_key) else {
            state.stats.unknown += 1;
            tracing::debug!(type_key, "no renderer registered, using fallback");
            return future::ready(Resolution::Fallback(FallbackCause::UnknownType)).boxed();
        };

        state.stats.loads += 1;
        tracing::info!(type_key, "loading renderer");
        let load = self.load(type_key.to_string(), loader).boxed().shared();
        state.in_flight.insert(type_key.to_string(), load.clone());
        load.boxed()
    }

    fn load(&self, type_key: String, loader: Loader) -> impl std::future::Future<Output = Resolution> + Send + 'static {
        let state = Arc::clone(&self.state);
        async move {
            let result = match AssertUnwindSafe(loader.load()).catch_unwind().await {
                Ok(result) => result,
                Err(_) => Err(LoadError::Panicked(type_key.clone())),
            };

            let mut state = state.lock();
            state.in_flight.remove(&type_key);
            match result {
                Ok(renderer) => {
                    if let Some((evicted, _)) = state.cache.push(type_key.clone(), Arc::clone(&renderer)) {
                        if evicted != type_key {
                            state.stats.evictions += 1;
                            tracing::info!(evicted = %evicted, inserted = %type_key, "evicted least recently used renderer");
                        }
                    }
                    Resolution::Loaded(renderer)
                }
                Err(error) => {
                    state.stats.load_failures += 1;
                    tracing::warn!(type_key = %type_key, %error, "renderer load failed, using fallback");
                    Resolution::Fallback(FallbackCause::LoadFailed)
                }
            }
        }
    }

    /// Resolve several types concurrently to warm the cache
    pub async fn preload<I, S>(&self, type_keys: I) -> Vec<Resolution>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pending: Vec<_> = type_keys
            .into_iter()
            .map(|key| self.resolve(key.as_ref()))
            .collect();
        future::join_all(pending).await
    }

    /// Cached renderer without promoting it
    #[must_use]
    pub fn peek(&self, type_key: &str) -> Option<Arc<dyn Renderer>> {
        self.state.lock().cache.peek(type_key).cloned()
    }

    /// Check if a type is cached, without promoting it
    #[must_use]
    pub fn is_cached(&self, type_key: &str) -> bool {
        self.state.lock().cache.contains(type_key)
    }

    /// Cached types, most recently used first
    #[must_use]
    pub fn cached_types(&self) -> Vec<String> {
        self.state
            .lock()
            .cache
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Number of loads currently in flight
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight.len()
    }

    /// Drop a cached renderer; returns whether it was present
    pub fn invalidate(&self, type_key: &str) -> bool {
        self.state.lock().cache.pop(type_key).is_some()
    }

    /// Drop every cached renderer
    pub fn clear(&self) {
        self.state.lock().cache.clear();
    }

    /// Cache capacity
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.state.lock().cache.cap().get()
    }

    /// Snapshot of counters
    #[must_use]
    pub fn stats(&self) -> ResolverStats {
        self.state.lock().stats
    }

    /// The registry this resolver loads from
    #[must_use]
    pub fn registry(&self) -> &RendererRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::event::Event;
    use crate::view::View;

    #[derive(Debug)]
    struct Named(&'static str);

    impl Renderer for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn render(&self, _event: &Event) -> Result<View, RenderError> {
            Ok(View::new(self.0, self.0))
        }
    }

    fn registry(keys: &[&'static str]) -> RendererRegistry {
        let mut registry = RendererRegistry::new();
        for key in keys {
            let key = *key;
            registry.register(key, move || async move {
                Ok(Arc::new(Named(key)) as Arc<dyn Renderer>)
            });
        }
        registry
    }

    fn resolver(keys: &[&'static str], capacity: usize) -> RendererResolver {
        RendererResolver::new(registry(keys), NonZeroUsize::new(capacity).unwrap())
    }

    #[tokio::test]
    async fn resolves_registered_type() {
        let resolver = resolver(&["a"], 4);
        let resolution = resolver.resolve("a").await;
        assert_eq!(resolution.renderer().unwrap().name(), "a");
        assert!(resolver.is_cached("a"));
        assert_eq!(resolver.in_flight(), 0);
    }

    #[tokio::test]
    async fn unknown_type_is_fallback_and_not_cached() {
        let resolver = resolver(&[], 4);
        let resolution = resolver.resolve("mystery").await;
        assert!(matches!(resolution, Resolution::Fallback(FallbackCause::UnknownType)));
        assert!(resolver.cached_types().is_empty());
        assert_eq!(resolver.stats().unknown, 1);
    }

    #[tokio::test]
    async fn cache_hit_is_immediately_ready() {
        let resolver = resolver(&["a"], 4);
        resolver.resolve("a").await;

        let hit = resolver.resolve("a").now_or_never();
        assert!(hit.is_some_and(|r| r.is_loaded()));
        assert_eq!(resolver.stats().hits, 1);
        assert_eq!(resolver.stats().loads, 1);
    }

    #[tokio::test]
    async fn hits_promote_entries() {
        let resolver = resolver(&["a", "b", "c"], 2);
        resolver.resolve("a").await;
        resolver.resolve("b").await;
        resolver.resolve("a").await;
        resolver.resolve("c").await;

        assert_eq!(resolver.cached_types(), vec!["c".to_string(), "a".to_string()]);
        assert_eq!(resolver.stats().evictions, 1);
    }

    #[tokio::test]
    async fn peek_does_not_promote() {
        let resolver = resolver(&["a", "b", "c"], 2);
        resolver.resolve("a").await;
        resolver.resolve("b").await;
        assert!(resolver.peek("a").is_some());
        resolver.resolve("c").await;

        assert!(!resolver.is_cached("a"));
        assert!(resolver.is_cached("b"));
    }

    #[tokio::test]
    async fn invalidate_forces_reload() {
        let resolver = resolver(&["a"], 2);
        resolver.resolve("a").await;
        assert!(resolver.invalidate("a"));
        assert!(!resolver.invalidate("a"));
        resolver.resolve("a").await;
        assert_eq!(resolver.stats().loads, 2);
    }

    #[tokio::test]
    async fn preload_warms_cache() {
        let resolver = resolver(&["a", "b"], 4);
        let results = resolver.preload(["a", "b", "zzz"]).await;
        assert_eq!(results.len(), 3);
        assert!(!results[2].is_loaded());
        assert_eq!(resolver.cached_types().len(), 2);
    }

    #[test]
    fn from_config_rejects_zero_capacity() {
        let config = FeedConfig::default().with_cache_capacity(0);
        assert!(RendererResolver::from_config(RendererRegistry::new(), &config).is_err());
    }

    #[test]
    fn resolver_debug() {
        let debug_str = format!("{:?}", resolver(&["a"], 3));
        assert!(debug_str.contains("RendererResolver"));
        assert!(debug_str.contains("capacity"));
    }
}
