//! Resolver Tests
//!
//! Cache, in-flight sharing and failure recovery of the renderer resolver.
//!
use agora_render::prelude::*;
use agora_render::{FallbackCause, ReadyLoader};
use agora_test_utils::{CountingLoader, FlakyLoader, GatedLoader, PanickingLoader, StaticRenderer};
use futures::future::{join_all, FutureExt};
use pretty_assertions::assert_eq;
use std::num::NonZeroUsize;

fn resolver(registry: RendererRegistry, capacity: usize) -> RendererResolver {
    RendererResolver::new(registry, NonZeroUsize::new(capacity).unwrap())
}

#[tokio::test]
async fn test_concurrent_resolves_share_one_load() {
    let loader = CountingLoader::new("shared");
    let mut registry = RendererRegistry::new();
    registry.register("shared", loader.clone());
    let resolver = resolver(registry, 4);

    let pending: Vec<_> = (0..8).map(|_| resolver.resolve("shared")).collect();
    assert_eq!(resolver.in_flight(), 1);

    let results = join_all(pending).await;
    assert!(results.iter().all(Resolution::is_loaded));
    assert_eq!(loader.calls(), 1);
    assert_eq!(resolver.in_flight(), 0);

    let stats = resolver.stats();
    assert_eq!(stats.loads, 1);
    assert_eq!(stats.joined, 7);
}

#[tokio::test]
async fn test_capacity_overflow_evicts_least_recently_used() {
    let loaders: Vec<_> = ["a", "b", "c"].into_iter().map(CountingLoader::new).collect();
    let mut registry = RendererRegistry::new();
    for (key, loader) in ["a", "b", "c"].into_iter().zip(&loaders) {
        registry.register(key, loader.clone());
    }
    let resolver = resolver(registry, 2);

    resolver.preload(["a", "b", "c"]).await;
    assert_eq!(resolver.cached_types(), vec!["c".to_string(), "b".to_string()]);
    assert_eq!(resolver.stats().evictions, 1);

    let again = resolver.resolve("a").await;
    assert_eq!(again.renderer().map(|r| r.name().to_string()), Some("a".to_string()));
    assert_eq!(loaders[0].calls(), 2);
    assert!(!resolver.is_cached("b"));
}

#[tokio::test]
async fn test_failed_load_is_retried() {
    let loader = FlakyLoader::new("flaky", 1);
    let mut registry = RendererRegistry::new();
    registry.register("flaky", loader.clone());
    let resolver = resolver(registry, 4);

    let first = resolver.resolve("flaky").await;
    assert!(matches!(first, Resolution::Fallback(FallbackCause::LoadFailed)));
    assert!(!resolver.is_cached("flaky"));
    assert_eq!(resolver.in_flight(), 0);

    let second = resolver.resolve("flaky").await;
    assert!(second.is_loaded());
    assert_eq!(loader.calls(), 2);
    assert_eq!(resolver.stats().load_failures, 1);
}

#[tokio::test]
async fn test_unknown_type_never_fails() {
    let resolver = resolver(RendererRegistry::with_defaults(), 4);
    for _ in 0..3 {
        let resolution = resolver.resolve("no_such_event").await;
        assert!(matches!(resolution, Resolution::Fallback(FallbackCause::UnknownType)));
    }
    assert!(resolver.cached_types().is_empty());
    assert_eq!(resolver.stats().unknown, 3);
}

#[tokio::test]
async fn test_panicking_loader_falls_back() {
    let mut registry = RendererRegistry::new();
    registry.register("boom", PanickingLoader);
    let resolver = resolver(registry, 4);

    let resolution = resolver.resolve("boom").await;
    assert!(matches!(resolution, Resolution::Fallback(FallbackCause::LoadFailed)));
    assert_eq!(resolver.in_flight(), 0);
}

#[tokio::test]
async fn test_gated_load_serves_every_waiter() {
    let gate = GatedLoader::new("gated");
    let mut registry = RendererRegistry::new();
    registry.register("gated", gate.clone());
    let resolver = resolver(registry, 4);

    let opener = async {
        tokio::task::yield_now().await;
        gate.open();
    };
    let (first, second, ()) = tokio::join!(resolver.resolve("gated"), resolver.resolve("gated"), opener);

    assert!(first.is_loaded());
    assert!(second.is_loaded());
    assert_eq!(gate.calls(), 1);
}

#[tokio::test]
async fn test_abandoned_load_completes_for_next_caller() {
    let gate = GatedLoader::new("gated");
    let mut registry = RendererRegistry::new();
    registry.register("gated", gate.clone());
    let resolver = resolver(registry, 4);

    let mut abandoned = resolver.resolve("gated");
    assert!((&mut abandoned).now_or_never().is_none());
    drop(abandoned);
    assert_eq!(resolver.in_flight(), 1);

    gate.open();
    let resolution = resolver.resolve("gated").await;
    assert!(resolution.is_loaded());
    assert_eq!(gate.calls(), 1);
    assert!(resolver.is_cached("gated"));
}

#[tokio::test]
async fn test_isolated_resolvers_do_not_share_cache() {
    let mut registry = RendererRegistry::new();
    registry.register("static", ReadyLoader::new(StaticRenderer::new("static")));

    let first = resolver(registry.clone(), 2);
    let second = resolver(registry, 2);
    first.resolve("static").await;

    assert!(first.is_cached("static"));
    assert!(!second.is_cached("static"));
}
