//! Synthesis renderer
//!
//! Runs the synthesis blob through the section extractor and renders the
//! sections in canonical order, followed by the recommended actions visible in
//! the event's sub-problem scope.

use crate::error::RenderError;
use crate::event::Event;
use crate::renderer::Renderer;
use crate::renderers::time_label;
use crate::view::{Block, View};
use agora_synthesis::{extract, filter_actions, ExtractionKind};

/// Renders `synthesis_complete` style events
#[derive(Debug, Clone)]
pub struct SynthesisRenderer {
    fields: Vec<String>,
    scope_field: String,
}

impl Default for SynthesisRenderer {
    fn default() -> Self {
        let config = crate::config::FeedConfig::default();
        Self::new(config.synthesis_fields, config.scope_field)
    }
}

impl SynthesisRenderer {
    /// Renderer name
    pub const NAME: &'static str = "synthesis";

    /// Create renderer reading the blob from the first present of `fields`
    #[must_use]
    pub fn new(fields: Vec<String>, scope_field: String) -> Self {
        Self { fields, scope_field }
    }

    fn blob<'a>(&self, event: &'a Event) -> Option<&'a str> {
        self.fields
            .iter()
            .filter_map(|field| event.str_field(field))
            .find(|text| !text.trim().is_empty())
    }
}

impl Renderer for SynthesisRenderer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn render(&self, event: &Event) -> Result<View, RenderError> {
        let blob = self
            .blob(event)
            .ok_or_else(|| RenderError::MissingField(self.fields.join("|")))?;

        let extraction = extract(blob);
        if extraction.kind == ExtractionKind::Raw {
            return Err(RenderError::UnstructuredSynthesis);
        }

        let scope = event
            .u64_field(&self.scope_field)
            .and_then(|index| usize::try_from(index).ok());

        let title = if event.event_type.starts_with("meta_") {
            "Meta-Synthesis"
        } else {
            "Synthesis"
        };
        let mut view = View::new(Self::NAME, title);

        let subtitle: Vec<String> = scope
            .map(|index| format!("Sub-problem {}", index.saturating_add(1)))
            .into_iter()
            .chain(time_label(event))
            .collect();
        if !subtitle.is_empty() {
            view.subtitle = Some(subtitle.join(" · "));
        }

        for (key, body) in extraction.sections.iter() {
            view.push(Block::section(key.title(), body));
        }

        if let Some(actions) = extraction.sections.actions() {
            let visible: Vec<_> = filter_actions(actions, scope).into_iter().cloned().collect();
            tracing::debug!(total = actions.len(), visible = visible.len(), ?scope, "filtered recommended actions");
            if !visible.is_empty() {
                view.push(Block::Actions { items: visible });
            }
        }

        Ok(view)
    }
}
