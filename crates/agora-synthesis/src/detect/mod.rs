//! Section detectors for synthesis text
//!
//! Each detector recognizes one surface format:
//! - JSON objects carrying recommended actions ([`JsonDetector`])
//! - `<section>…</section>` tag pairs ([`TaggedDetector`])
//! - Markdown-style headings ([`HeadingDetector`])
//!
//! A [`DetectorChain`] tries them in priority order; the first one to produce
//! a section wins, and the raw fallback applies when none does.

use crate::section::{SectionKey, SectionMap};
use serde::{Deserialize, Serialize};
use std::fmt;

mod heading;
mod json;
mod tagged;

pub use heading::HeadingDetector;
pub use json::{find_balanced_object, JsonDetector};
pub use tagged::TaggedDetector;

/// Which detector produced an extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionKind {
    /// Structured JSON object
    Json,
    /// Tag-delimited sections
    Tagged,
    /// Heading-delimited sections
    Heading,
    /// No structure found; whole text under `summary`
    Raw,
}

impl ExtractionKind {
    /// Lowercase name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionKind::Json => "json",
            ExtractionKind::Tagged => "tagged",
            ExtractionKind::Heading => "heading",
            ExtractionKind::Raw => "raw",
        }
    }
}

impl fmt::Display for ExtractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running the detector chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// Detector that matched
    pub kind: ExtractionKind,
    /// Extracted sections
    pub sections: SectionMap,
}

impl Extraction {
    /// Raw fallback extraction for `text`
    #[must_use]
    pub fn raw(text: &str) -> Self {
        Self {
            kind: ExtractionKind::Raw,
            sections: SectionMap::raw(text),
        }
    }
}

/// A single surface-format detector
///
/// Implementations must be total: malformed or truncated input yields `None`,
/// never a panic.
pub trait SectionDetector: Send + Sync + 'static {
    /// Kind reported when this detector matches
    fn kind(&self) -> ExtractionKind;

    /// Try to decompose `text`; `None` means "not this format"
    fn detect(&self, text: &str) -> Option<SectionMap>;

    /// Higher runs first
    fn priority(&self) -> i32 {
        0
    }
}

/// Ordered set of detectors with a raw fallback
pub struct DetectorChain {
    detectors: Vec<Box<dyn SectionDetector>>,
}

impl Default for DetectorChain {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for DetectorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectorChain")
            .field("kinds", &self.kinds())
            .finish()
    }
}

impl DetectorChain {
    /// Chain with no detectors; every input falls through to raw
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    /// JSON, then tagged, then heading detection
    #[must_use]
    pub fn standard() -> Self {
        let mut chain = Self::empty();
        chain.register(JsonDetector);
        chain.register(TaggedDetector);
        chain.register(HeadingDetector);
        chain
    }

    /// Add a detector, keeping priority order (stable for equal priorities)
    pub fn register<D: SectionDetector>(&mut self, detector: D) {
        self.detectors.push(Box::new(detector));
        self.detectors
            .sort_by_key(|d| std::cmp::Reverse(d.priority()));
    }

    /// Detector kinds in the order they run
    #[must_use]
    pub fn kinds(&self) -> Vec<ExtractionKind> {
        self.detectors.iter().map(|d| d.kind()).collect()
    }

    /// Run detectors in order; first non-empty result wins
    #[must_use]
    pub fn extract(&self, text: &str) -> Extraction {
        for detector in &self.detectors {
            if let Some(sections) = detector.detect(text) {
                if !sections.is_empty() {
                    tracing::debug!(kind = %detector.kind(), sections = sections.len(), "synthesis structure detected");
                    return Extraction {
                        kind: detector.kind(),
                        sections,
                    };
                }
            }
        }
        tracing::debug!(len = text.len(), "no synthesis structure detected, using raw fallback");
        Extraction::raw(text)
    }
}

/// Section key for a field or tag name
///
/// A bare `summary` field from upstream is an executive summary; the
/// [`SectionKey::Summary`] slot stays reserved for the raw fallback.
pub(crate) fn structured_key(name: &str) -> Option<SectionKey> {
    match SectionKey::from_name(name)? {
        SectionKey::Summary => Some(SectionKey::ExecutiveSummary),
        key => Some(key),
    }
}
