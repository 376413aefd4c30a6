//! Renderer output
//!
//! A [`View`] is a display-agnostic description of one rendered event. The
//! external display layer decides how blocks look; `Display` gives a plain
//! text rendering used by the replay tool.

use agora_synthesis::ActionItem;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One rendered event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    /// Name of the renderer that produced the view
    pub renderer: String,
    /// Headline
    pub title: String,
    /// Secondary line (time, persona, round)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Body content, top to bottom
    pub blocks: Vec<Block>,
}

/// A unit of view content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// Plain paragraph
    Text {
        /// Paragraph text
        text: String,
    },
    /// Titled body of text
    Section {
        /// Section title
        title: String,
        /// Section body
        body: String,
    },
    /// Label/value pairs
    Fields {
        /// Pairs in display order
        fields: Vec<(String, String)>,
    },
    /// Structured recommended actions
    Actions {
        /// Actions in display order
        items: Vec<ActionItem>,
    },
    /// Collapsed by default; used for raw payload dumps
    Collapsible {
        /// Always-visible summary line
        summary: String,
        /// Hidden body
        body: String,
    },
}

impl View {
    /// Create view with no blocks
    #[must_use]
    pub fn new(renderer: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            renderer: renderer.into(),
            title: title.into(),
            subtitle: None,
            blocks: Vec::new(),
        }
    }

    /// With subtitle
    #[must_use]
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Append a block
    #[must_use]
    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// Append a block in place
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }
}

impl Block {
    /// Paragraph block
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Section block
    #[must_use]
    pub fn section(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Section {
            title: title.into(),
            body: body.into(),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.title)?;
        if let Some(subtitle) = &self.subtitle {
            writeln!(f, "   {subtitle}")?;
        }
        for block in &self.blocks {
            write!(f, "{block}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Block::Text { text } => writeln!(f, "{text}"),
            Block::Section { title, body } => writeln!(f, "[{title}]\n{body}"),
            Block::Fields { fields } => {
                for (label, value) in fields {
                    writeln!(f, "{label}: {value}")?;
                }
                Ok(())
            }
            Block::Actions { items } => {
                writeln!(f, "[Recommended Actions]")?;
                for (i, action) in items.iter().enumerate() {
                    writeln!(f, "{}. {} ({}, {})", i + 1, action.title, action.priority, action.timeline)?;
                    if !action.rationale.is_empty() {
                        writeln!(f, "   why: {}", action.rationale)?;
                    }
                }
                Ok(())
            }
            Block::Collapsible { summary, .. } => writeln!(f, "▸ {summary}"),
        }
    }
}
