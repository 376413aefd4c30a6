//! Persona contribution renderer

use crate::error::RenderError;
use crate::event::Event;
use crate::renderer::Renderer;
use crate::renderers::time_label;
use crate::view::{Block, View};

const PERSONA_FIELDS: [&str; 3] = ["persona_name", "persona", "persona_code"];
const CONTENT_FIELDS: [&str; 3] = ["content", "contribution", "text"];
const ROUND_FIELDS: [&str; 2] = ["round", "round_number"];

/// Renders one persona's contribution to a round
#[derive(Debug, Clone, Copy, Default)]
pub struct ContributionRenderer;

impl ContributionRenderer {
    /// Renderer name
    pub const NAME: &'static str = "contribution";
}

fn first_str<'a>(event: &'a Event, fields: &[&str]) -> Option<&'a str> {
    fields
        .iter()
        .filter_map(|field| event.str_field(field))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

impl Renderer for ContributionRenderer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn render(&self, event: &Event) -> Result<View, RenderError> {
        let content =
            first_str(event, &CONTENT_FIELDS).ok_or_else(|| RenderError::MissingField("content".to_string()))?;
        let persona = first_str(event, &PERSONA_FIELDS).unwrap_or("Unknown persona");

        let mut subtitle = Vec::new();
        if let Some(round) = ROUND_FIELDS.iter().find_map(|field| event.u64_field(field)) {
            subtitle.push(format!("Round {round}"));
        }
        subtitle.extend(time_label(event));

        let mut view = View::new(Self::NAME, persona).with_block(Block::text(content));
        if !subtitle.is_empty() {
            view.subtitle = Some(subtitle.join(" · "));
        }
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_persona_and_round() {
        let event = Event::new("persona_contribution")
            .with_data(json!({"persona_name": "Maria", "content": "We should wait.", "round": 2}))
            .with_timestamp("2024-05-01T12:30:05Z");
        let view = ContributionRenderer.render(&event).unwrap();
        assert_eq!(view.title, "Maria");
        assert_eq!(view.subtitle.as_deref(), Some("Round 2 · 12:30:05"));
        assert_eq!(view.blocks, vec![Block::text("We should wait.")]);
    }

    #[test]
    fn alternate_field_names() {
        let event = Event::new("contribution")
            .with_data(json!({"persona_code": "cfo", "contribution": "Costs rise.", "round_number": "3"}));
        let view = ContributionRenderer.render(&event).unwrap();
        assert_eq!(view.title, "cfo");
        assert_eq!(view.subtitle.as_deref(), Some("Round 3"));
    }

    #[test]
    fn missing_content_is_an_error() {
        let event = Event::new("contribution").with_data(json!({"persona_name": "Maria"}));
        assert_eq!(
            ContributionRenderer.render(&event).unwrap_err(),
            RenderError::MissingField("content".to_string())
        );
    }
}
