//! Agora Event Rendering
//!
//! Turns a stream of deliberation events into display-ready views. Renderers
//! are resolved per event type through a bounded, deduplicating cache, and
//! every event always renders to something: a type-specific view when its
//! renderer loads and succeeds, the generic fallback view otherwise.
//!
//! # Architecture
//!
//! ```text
//! Event ─► RenderingSurface ─► RendererResolver ─► RendererRegistry
//!               │                   │ (LRU + in-flight)     │
//!               │◄── Resolution ────┘                 lazy loaders
//!               ▼
//!         SlotView (arrival order)
//! ```
//!
//! # Example
//!
//! ```rust
//! use agora_render::{Event, FeedConfig, RendererRegistry, RenderingSurface};
//!
//! futures::executor::block_on(async {
//!     let mut surface =
//!         RenderingSurface::from_config(RendererRegistry::with_defaults(), &FeedConfig::default()).unwrap();
//!     surface.push(Event::new("something_new"));
//!     surface.settle_all().await;
//!     assert_eq!(surface.views()[0].view.title, "Something New");
//! });
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod event;
pub mod registry;
pub mod renderer;
pub mod renderers;
pub mod resolver;
pub mod surface;
pub mod view;

pub use config::FeedConfig;
pub use error::{ConfigError, FeedError, FeedResult, LoadError, RenderError};
pub use event::Event;
pub use registry::{Loader, ReadyLoader, RendererLoader, RendererRegistry};
pub use renderer::{humanize_event_type, FallbackRenderer, Renderer};
pub use resolver::{FallbackCause, RendererResolver, Resolution, ResolverStats};
pub use surface::{FallbackReason, RenderState, RenderingSurface, SlotId, SlotView};
pub use view::{Block, View};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building and driving a rendering feed
    pub use crate::config::FeedConfig;
    pub use crate::error::{FeedError, FeedResult, LoadError, RenderError};
    pub use crate::event::Event;
    pub use crate::registry::{RendererLoader, RendererRegistry};
    pub use crate::renderer::{FallbackRenderer, Renderer};
    pub use crate::resolver::{RendererResolver, Resolution};
    pub use crate::surface::{FallbackReason, RenderState, RenderingSurface, SlotId};
    pub use crate::view::{Block, View};
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn default_feed_renders_mixed_events() {
        let mut surface = RenderingSurface::from_config(RendererRegistry::with_defaults(), &FeedConfig::default()).unwrap();
        surface.extend([
            Event::new("round_started").with_data(json!({"round": 1})),
            Event::new("persona_contribution").with_data(json!({"persona_name": "Ada", "content": "Yes."})),
            Event::new("synthesis_complete").with_data(json!({"synthesis": "no structure here"})),
            Event::new("vote_cast").with_data(json!({"persona": "Ada"})),
        ]);
        surface.settle_all().await;

        let states: Vec<_> = surface.views().into_iter().map(|slot| slot.state).collect();
        assert_eq!(states, vec!["rendered", "rendered", "fallback", "fallback"]);
    }

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
