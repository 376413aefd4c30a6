//! Error event renderer

use crate::error::RenderError;
use crate::event::Event;
use crate::renderer::Renderer;
use crate::renderers::time_label;
use crate::view::{Block, View};
use serde_json::Value;

/// Renders `error` events reported by the deliberation backend
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorRenderer;

impl ErrorRenderer {
    /// Renderer name
    pub const NAME: &'static str = "error";
}

impl Renderer for ErrorRenderer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn render(&self, event: &Event) -> Result<View, RenderError> {
        let message = event
            .str_field("message")
            .or_else(|| event.str_field("error"))
            .ok_or_else(|| RenderError::MissingField("message".to_string()))?;

        let mut fields = Vec::new();
        if let Some(code) = event.data.get("code") {
            let code = match code {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            fields.push(("Code".to_string(), code));
        }
        match event.data.get("recoverable") {
            Some(Value::Bool(recoverable)) => {
                let label = if *recoverable { "yes" } else { "no" };
                fields.push(("Recoverable".to_string(), label.to_string()));
            }
            Some(other) => {
                return Err(RenderError::invalid_field("recoverable", format!("expected bool, got {other}")));
            }
            None => {}
        }

        let mut view = View::new(Self::NAME, "Error").with_block(Block::text(message));
        view.subtitle = time_label(event);
        if !fields.is_empty() {
            view.push(Block::Fields { fields });
        }
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_message_and_fields() {
        let event = Event::new("error").with_data(json!({"message": "LLM timeout", "code": 504, "recoverable": true}));
        let view = ErrorRenderer.render(&event).unwrap();
        assert_eq!(view.title, "Error");
        assert_eq!(
            view.blocks,
            vec![
                Block::text("LLM timeout"),
                Block::Fields {
                    fields: vec![
                        ("Code".to_string(), "504".to_string()),
                        ("Recoverable".to_string(), "yes".to_string()),
                    ]
                },
            ]
        );
    }

    #[test]
    fn accepts_error_field() {
        let event = Event::new("error").with_data(json!({"error": "boom"}));
        let view = ErrorRenderer.render(&event).unwrap();
        assert_eq!(view.blocks, vec![Block::text("boom")]);
    }

    #[test]
    fn rejects_malformed_payloads() {
        let missing = Event::new("error").with_data(json!({"code": "E1"}));
        assert!(matches!(ErrorRenderer.render(&missing), Err(RenderError::MissingField(_))));

        let bad = Event::new("error").with_data(json!({"message": "x", "recoverable": "maybe"}));
        assert!(matches!(ErrorRenderer.render(&bad), Err(RenderError::InvalidField { .. })));
    }
}
