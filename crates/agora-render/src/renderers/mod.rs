//! Built-in deliberation renderers
//!
//! Each renderer is registered behind a lazy loader so it is only constructed
//! the first time its event type is displayed.

use crate::config::FeedConfig;
use crate::error::LoadError;
use crate::registry::RendererRegistry;
use crate::renderer::Renderer;
use std::sync::Arc;

mod contribution;
mod failure;
mod progress;
mod synthesis;

pub use contribution::ContributionRenderer;
pub use failure::ErrorRenderer;
pub use progress::ProgressRenderer;
pub use synthesis::SynthesisRenderer;

/// Types handled by [`SynthesisRenderer`]
pub const SYNTHESIS_TYPES: [&str; 2] = ["synthesis_complete", "meta_synthesis_complete"];

/// Types handled by [`ContributionRenderer`]
pub const CONTRIBUTION_TYPES: [&str; 2] = ["contribution", "persona_contribution"];

/// Types handled by [`ProgressRenderer`]
pub const PROGRESS_TYPES: [&str; 5] = [
    "round_started",
    "subproblem_started",
    "phase_changed",
    "convergence_checked",
    "deliberation_complete",
];

/// Types handled by [`ErrorRenderer`]
pub const ERROR_TYPES: [&str; 1] = ["error"];

/// Register built-in renderers with default configuration
pub fn register_builtin(registry: &mut RendererRegistry) {
    register_builtin_with(registry, &FeedConfig::default());
}

/// Register built-in renderers using `config` for payload field names
pub fn register_builtin_with(registry: &mut RendererRegistry, config: &FeedConfig) {
    for type_key in SYNTHESIS_TYPES {
        let fields = config.synthesis_fields.clone();
        let scope_field = config.scope_field.clone();
        registry.register(type_key, move || {
            let loaded = if fields.is_empty() {
                Err(LoadError::rejected(type_key, "no synthesis fields configured"))
            } else {
                Ok(Arc::new(SynthesisRenderer::new(fields.clone(), scope_field.clone())) as Arc<dyn Renderer>)
            };
            async move { loaded }
        });
    }
    for type_key in CONTRIBUTION_TYPES {
        registry.register(type_key, || async {
            Ok(Arc::new(ContributionRenderer) as Arc<dyn Renderer>)
        });
    }
    for type_key in PROGRESS_TYPES {
        registry.register(type_key, || async {
            Ok(Arc::new(ProgressRenderer) as Arc<dyn Renderer>)
        });
    }
    for type_key in ERROR_TYPES {
        registry.register(type_key, || async {
            Ok(Arc::new(ErrorRenderer) as Arc<dyn Renderer>)
        });
    }
}

/// `HH:MM:SS` subtitle fragment for an event, if its timestamp parses
pub(crate) fn time_label(event: &crate::event::Event) -> Option<String> {
    event
        .parsed_timestamp()
        .map(|ts| ts.format("%H:%M:%S").to_string())
}
