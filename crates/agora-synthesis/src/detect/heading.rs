//! Heading-delimited section detection
//!
//! Uses pulldown-cmark to find heading-like lines:
//! - ATX and setext headings
//! - bold-only paragraphs (`**Rationale**`)
//! - lead-in labels (`**Rationale:** text…`)
//! - short single-line labels ending in a colon (`Rationale:`)
//!
//! Heading text is normalized and matched to a [`SectionKey`] by alias
//! containment, longest alias first. Unmatched headings are ignored; an
//! unmatched heading deeper than the current section does not end it.

use crate::detect::{ExtractionKind, SectionDetector};
use crate::section::{SectionKey, SectionMap};
use once_cell::sync::Lazy;
use pulldown_cmark::{Event, Parser as MdParser, Tag, TagEnd};
use std::ops::Range;

/// Longest plain-text label accepted as a heading
const MAX_LABEL_LEN: usize = 60;

/// Level assigned to bold and label pseudo-headings
const PSEUDO_LEVEL: u8 = 7;

static ALIASES: Lazy<Vec<(&'static str, SectionKey)>> = Lazy::new(|| {
    let mut table: Vec<_> = SectionKey::ALL
        .iter()
        .flat_map(|key| key.aliases().iter().map(move |alias| (*alias, *key)))
        .collect();
    table.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));
    table
});

/// Detects Markdown-ish headings that name known sections
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingDetector;

#[derive(Debug)]
struct Candidate {
    key: Option<SectionKey>,
    level: u8,
    span_start: usize,
    body_start: usize,
}

#[derive(Debug, Default)]
struct ParagraphScan {
    start: usize,
    text: String,
    outside_strong: String,
    lead: Option<(String, usize)>,
    lead_text: String,
    strong_depth: usize,
    first_is_strong: Option<bool>,
    multiline: bool,
}

impl ParagraphScan {
    fn new(start: usize) -> Self {
        Self {
            start,
            ..Self::default()
        }
    }

    fn text(&mut self, t: &str) {
        self.text.push_str(t);
        if self.strong_depth > 0 {
            if self.lead.is_none() && self.first_is_strong == Some(true) {
                self.lead_text.push_str(t);
            }
        } else {
            if self.first_is_strong.is_none() && !t.trim().is_empty() {
                self.first_is_strong = Some(false);
            }
            self.outside_strong.push_str(t);
        }
    }

    fn start_strong(&mut self) {
        if self.strong_depth == 0 && self.first_is_strong.is_none() {
            self.first_is_strong = Some(true);
        }
        self.strong_depth += 1;
    }

    fn end_strong(&mut self, range: &Range<usize>) {
        self.strong_depth = self.strong_depth.saturating_sub(1);
        if self.strong_depth == 0 && self.lead.is_none() && self.first_is_strong == Some(true) {
            self.lead = Some((std::mem::take(&mut self.lead_text), range.end));
        }
    }

    fn finish(self, end: usize) -> Option<(String, usize)> {
        let outside = self.outside_strong.trim();

        if let Some((lead, lead_end)) = self.lead {
            let lead = lead.trim();
            if outside.is_empty() || outside == ":" {
                return (!self.multiline).then(|| (lead.to_string(), end));
            }
            if lead.ends_with(':') || outside.starts_with(':') {
                return Some((lead.to_string(), lead_end));
            }
            return None;
        }

        let text = self.text.trim();
        if !self.multiline
            && self.first_is_strong == Some(false)
            && text.ends_with(':')
            && text.len() <= MAX_LABEL_LEN
        {
            return Some((text.to_string(), end));
        }
        None
    }
}

impl SectionDetector for HeadingDetector {
    fn kind(&self) -> ExtractionKind {
        ExtractionKind::Heading
    }

    fn detect(&self, text: &str) -> Option<SectionMap> {
        let candidates = scan_candidates(text);
        if candidates.iter().all(|c| c.key.is_none()) {
            return None;
        }

        let mut sections = SectionMap::new();
        let mut current: Option<&Candidate> = None;

        for candidate in &candidates {
            if let Some(open) = current {
                if candidate.key.is_some() || candidate.level <= open.level {
                    push_body(&mut sections, text, open, candidate.span_start);
                    current = None;
                }
            }
            if candidate.key.is_some() && current.is_none() {
                current = Some(candidate);
            }
        }
        if let Some(open) = current {
            push_body(&mut sections, text, open, text.len());
        }

        if sections.is_empty() {
            None
        } else {
            Some(sections)
        }
    }

    fn priority(&self) -> i32 {
        10
    }
}

fn push_body(sections: &mut SectionMap, text: &str, open: &Candidate, end: usize) {
    let Some(key) = open.key else {
        return;
    };
    let body = text
        .get(open.body_start..end.max(open.body_start))
        .unwrap_or_default()
        .trim()
        .trim_start_matches(':')
        .trim();
    if !body.is_empty() {
        sections.append(key, body);
    }
}

fn scan_candidates(text: &str) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    let mut heading: Option<(u8, usize, String)> = None;
    let mut paragraph: Option<ParagraphScan> = None;

    for (event, range) in MdParser::new(text).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                heading = Some((level as u8, range.start, String::new()));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, start, title)) = heading.take() {
                    candidates.push(Candidate {
                        key: match_heading(&title),
                        level,
                        span_start: start,
                        body_start: range.end,
                    });
                }
            }
            Event::Start(Tag::Paragraph) => {
                paragraph = Some(ParagraphScan::new(range.start));
            }
            Event::End(TagEnd::Paragraph) => {
                if let Some(scan) = paragraph.take() {
                    let start = scan.start;
                    if let Some((title, body_start)) = scan.finish(range.end) {
                        candidates.push(Candidate {
                            key: match_heading(&title),
                            level: PSEUDO_LEVEL,
                            span_start: start,
                            body_start,
                        });
                    }
                }
            }
            Event::Start(Tag::Strong) => {
                if let Some(scan) = paragraph.as_mut() {
                    scan.start_strong();
                }
            }
            Event::End(TagEnd::Strong) => {
                if let Some(scan) = paragraph.as_mut() {
                    scan.end_strong(&range);
                }
            }
            Event::Text(t) | Event::Code(t) => {
                if let Some((_, _, title)) = heading.as_mut() {
                    title.push_str(&t);
                } else if let Some(scan) = paragraph.as_mut() {
                    scan.text(&t);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some(scan) = paragraph.as_mut() {
                    scan.multiline = true;
                }
            }
            _ => {}
        }
    }

    candidates
}

/// Lowercase, strip punctuation and leading enumeration
fn normalize_heading(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
        .collect();
    cleaned
        .split_whitespace()
        .skip_while(|word| word.chars().all(|c| c.is_ascii_digit()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Closest known section for a heading, if any
#[must_use]
pub(crate) fn match_heading(title: &str) -> Option<SectionKey> {
    let normalized = normalize_heading(title);
    if normalized.is_empty() {
        return None;
    }
    ALIASES
        .iter()
        .find(|(alias, _)| normalized.contains(alias))
        .map(|(_, key)| *key)
}
