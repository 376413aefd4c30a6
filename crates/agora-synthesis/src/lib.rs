//! Agora Synthesis Extraction
//!
//! Decomposes the free-form "synthesis" text produced at the end of a
//! deliberation into named sections and, when the text carries JSON, a list
//! of structured recommended actions.
//!
//! # Detection order
//!
//! ```text
//! text → JSON object? → tag pairs? → headings? → raw fallback
//!            ↓              ↓            ↓            ↓
//!                       Extraction { kind, sections }
//! ```
//!
//! Extraction is total and pure: truncated, malformed or empty input degrades
//! to whatever partial structure is recognizable or to the raw fallback, and
//! the same input always yields the same [`SectionMap`].
//!
//! # Example
//!
//! ```rust
//! use agora_synthesis::{extract, ExtractionKind, SectionKey};
//!
//! let extraction = extract("<rationale>Cheaper to run.</rationale>");
//! assert_eq!(extraction.kind, ExtractionKind::Tagged);
//! assert_eq!(extraction.sections.get(SectionKey::Rationale), Some("Cheaper to run."));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod detect;
pub mod error;
pub mod filter;
pub mod section;

pub use detect::{DetectorChain, Extraction, ExtractionKind, SectionDetector};
pub use error::PriorityParseError;
pub use filter::{filter_actions, in_scope, scope_references};
pub use section::{ActionItem, Priority, SectionKey, SectionMap};

use once_cell::sync::Lazy;

static STANDARD_CHAIN: Lazy<DetectorChain> = Lazy::new(DetectorChain::standard);

/// Run the standard detector chain, reporting which detector matched
#[must_use]
pub fn extract(text: &str) -> Extraction {
    STANDARD_CHAIN.extract(text)
}

/// Extract the section map of a synthesis blob
#[must_use]
pub fn extract_sections(text: &str) -> SectionMap {
    extract(text).sections
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with synthesis extraction
    pub use crate::detect::{DetectorChain, Extraction, ExtractionKind, SectionDetector};
    pub use crate::filter::filter_actions;
    pub use crate::section::{ActionItem, Priority, SectionKey, SectionMap};
    pub use crate::{extract, extract_sections};
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn json_wins_over_headings() {
        let text = "{\"recommendation\": \"from json\"}\n\n---\n\n## Rationale\n\nfrom markdown";
        let extraction = extract(text);
        assert_eq!(extraction.kind, ExtractionKind::Json);
        assert_eq!(extraction.sections.get(SectionKey::Recommendation), Some("from json"));
        assert!(!extraction.sections.contains(SectionKey::Rationale));
    }

    #[test]
    fn tags_win_over_headings() {
        let text = "## Rationale\n\nignored\n\n<recommendation>tagged</recommendation>";
        let extraction = extract(text);
        assert_eq!(extraction.kind, ExtractionKind::Tagged);
        assert_eq!(extraction.sections.len(), 1);
    }

    #[test]
    fn empty_input_is_raw() {
        let extraction = extract("");
        assert_eq!(extraction.kind, ExtractionKind::Raw);
        assert_eq!(extraction.sections.get(SectionKey::Summary), Some(""));
    }
}
