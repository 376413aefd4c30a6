//! Renderer registry
//!
//! Maps event type tags to asynchronous loaders. The registry is assembled up
//! front and read-only afterwards; a missing mapping is a normal outcome.

use crate::error::LoadError;
use crate::renderer::Renderer;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Zero-argument asynchronous factory for a renderer
#[async_trait]
pub trait RendererLoader: Send + Sync {
    /// Produce the renderer
    async fn load(&self) -> Result<Arc<dyn Renderer>, LoadError>;
}

#[async_trait]
impl<F, Fut> RendererLoader for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Arc<dyn Renderer>, LoadError>> + Send + 'static,
{
    async fn load(&self) -> Result<Arc<dyn Renderer>, LoadError> {
        (self)().await
    }
}

/// Shared loader handle
pub type Loader = Arc<dyn RendererLoader>;

/// Loader that hands out clones of an already constructed renderer
#[derive(Debug, Clone)]
pub struct ReadyLoader {
    renderer: Arc<dyn Renderer>,
}

impl ReadyLoader {
    /// Wrap a renderer
    #[must_use]
    pub fn new<R: Renderer>(renderer: R) -> Self {
        Self {
            renderer: Arc::new(renderer),
        }
    }
}

#[async_trait]
impl RendererLoader for ReadyLoader {
    async fn load(&self) -> Result<Arc<dyn Renderer>, LoadError> {
        Ok(Arc::clone(&self.renderer))
    }
}

/// Event type → loader table
#[derive(Clone, Default)]
pub struct RendererRegistry {
    loaders: HashMap<String, Loader>,
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("type_keys", &self.type_keys())
            .finish()
    }
}

impl RendererRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            loaders: HashMap::new(),
        }
    }

    /// Registry with the built-in deliberation renderers
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        crate::renderers::register_builtin(&mut registry);
        registry
    }

    /// Register a loader, replacing any previous one for `type_key`
    pub fn register<L: RendererLoader + 'static>(&mut self, type_key: impl Into<String>, loader: L) {
        self.loaders.insert(type_key.into(), Arc::new(loader));
    }

    /// Loader for `type_key`, if registered
    #[must_use]
    pub fn lookup_loader(&self, type_key: &str) -> Option<Loader> {
        self.loaders.get(type_key).cloned()
    }

    /// Check if a loader exists
    #[inline]
    #[must_use]
    pub fn contains(&self, type_key: &str) -> bool {
        self.loaders.contains_key(type_key)
    }

    /// Registered type keys, sorted
    #[must_use]
    pub fn type_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.loaders.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Number of registered types
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::FallbackRenderer;

    #[test]
    fn registry_new_empty() {
        let registry = RendererRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.lookup_loader("anything").is_none());
    }

    #[test]
    fn registry_with_defaults() {
        let registry = RendererRegistry::with_defaults();
        assert!(registry.contains("synthesis_complete"));
        assert!(registry.contains("persona_contribution"));
        assert!(registry.contains("round_started"));
        assert!(registry.contains("error"));
        assert!(!registry.contains("fallback"));
    }

    #[test]
    fn register_closure_loader() {
        let mut registry = RendererRegistry::new();
        registry.register("custom", || async {
            Ok(Arc::new(FallbackRenderer) as Arc<dyn Renderer>)
        });
        assert!(registry.contains("custom"));
        assert_eq!(registry.type_keys(), vec!["custom"]);
    }

    #[tokio::test]
    async fn ready_loader_returns_renderer() {
        let loader = ReadyLoader::new(FallbackRenderer);
        let renderer = loader.load().await.unwrap();
        assert_eq!(renderer.name(), FallbackRenderer::NAME);
    }

    #[test]
    fn registry_debug() {
        let debug_str = format!("{:?}", RendererRegistry::with_defaults());
        assert!(debug_str.contains("RendererRegistry"));
        assert!(debug_str.contains("synthesis_complete"));
    }
}
