//! Tag-delimited section detection
//!
//! Recognizes `<rationale>…</rationale>` style markup for the section
//! vocabulary. An opening tag left unclosed by a truncated stream captures up
//! to the next known opening tag or the end of input.

use crate::detect::{structured_key, ExtractionKind, SectionDetector};
use crate::section::{SectionKey, SectionMap};
use once_cell::sync::Lazy;
use regex::Regex;

fn tag_names() -> String {
    SectionKey::ALL
        .iter()
        .map(SectionKey::as_str)
        .collect::<Vec<_>>()
        .join("|")
}

static OPEN_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)<\s*({})\s*>", tag_names()))
        .expect("open tag pattern is built from constant section names")
});

static CLOSE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)<\s*/\s*({})\s*>", tag_names()))
        .expect("close tag pattern is built from constant section names")
});

/// Detects `<section_name>` tag pairs
#[derive(Debug, Clone, Copy, Default)]
pub struct TaggedDetector;

struct OpenTag<'a> {
    name: &'a str,
    start: usize,
    content_start: usize,
}

impl SectionDetector for TaggedDetector {
    fn kind(&self) -> ExtractionKind {
        ExtractionKind::Tagged
    }

    fn detect(&self, text: &str) -> Option<SectionMap> {
        let opens: Vec<OpenTag<'_>> = OPEN_TAG
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                Some(OpenTag {
                    name: caps.get(1)?.as_str(),
                    start: whole.start(),
                    content_start: whole.end(),
                })
            })
            .collect();

        let mut sections = SectionMap::new();
        let mut consumed = 0;

        for (i, open) in opens.iter().enumerate() {
            if open.start < consumed {
                continue;
            }
            let Some(key) = structured_key(open.name) else {
                continue;
            };

            let close = CLOSE_TAG
                .captures_iter(&text[open.content_start..])
                .find(|caps| {
                    caps.get(1)
                        .is_some_and(|name| name.as_str().eq_ignore_ascii_case(open.name))
                })
                .and_then(|caps| caps.get(0));

            let (body_end, next) = match close {
                Some(m) => (open.content_start + m.start(), open.content_start + m.end()),
                None => {
                    let end = opens[i + 1..]
                        .iter()
                        .map(|o| o.start)
                        .find(|start| *start >= open.content_start)
                        .unwrap_or(text.len());
                    (end, end)
                }
            };

            let body = text[open.content_start..body_end].trim();
            if !body.is_empty() {
                sections.append(key, body);
            }
            consumed = next;
        }

        if sections.is_empty() {
            None
        } else {
            Some(sections)
        }
    }

    fn priority(&self) -> i32 {
        20
    }
}
