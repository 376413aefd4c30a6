//! Renderer trait and the fallback renderer
//!
//! Every event type maps to a [`Renderer`]. The [`FallbackRenderer`] is the
//! universal safety net: it renders any event without failing.

use crate::error::RenderError;
use crate::event::Event;
use crate::view::{Block, View};
use std::fmt::Debug;

/// A view implementation for one or more event types
pub trait Renderer: Send + Sync + Debug + 'static {
    /// Renderer name, recorded on produced views
    fn name(&self) -> &str;

    /// Render an event
    ///
    /// # Errors
    /// Any error sends the event to the fallback renderer.
    fn render(&self, event: &Event) -> Result<View, RenderError>;
}

/// Generic renderer that cannot fail
///
/// Shows the humanized event type, the timestamp when it parses, and a
/// collapsed raw dump of non-empty payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackRenderer;

impl FallbackRenderer {
    /// Renderer name
    pub const NAME: &'static str = "fallback";

    /// Render infallibly
    #[must_use]
    pub fn render_event(&self, event: &Event) -> View {
        let mut view = View::new(Self::NAME, humanize_event_type(&event.event_type));
        if let Some(ts) = event.parsed_timestamp() {
            view.subtitle = Some(ts.format("%H:%M:%S").to_string());
        }
        if !event.is_empty_data() {
            let body = serde_json::to_string_pretty(&event.data)
                .unwrap_or_else(|_| format!("{:?}", event.data));
            view.push(Block::Collapsible {
                summary: format!("Raw data ({} fields)", event.data.len()),
                body,
            });
        }
        view
    }
}

impl Renderer for FallbackRenderer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn render(&self, event: &Event) -> Result<View, RenderError> {
        Ok(self.render_event(event))
    }
}

/// `persona_contribution` → `Persona Contribution`
///
/// Splits on `_`, `-`, `.`, `:` and whitespace. Empty tags become
/// `Unknown Event`.
#[must_use]
pub fn humanize_event_type(event_type: &str) -> String {
    let words: Vec<String> = event_type
        .split(|c: char| matches!(c, '_' | '-' | '.' | ':') || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();
    if words.is_empty() {
        "Unknown Event".to_string()
    } else {
        words.join(" ")
    }
}
