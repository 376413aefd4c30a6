//! Section vocabulary and extracted content types
//!
//! A synthesis blob is decomposed into a [`SectionMap`]: a mapping from a fixed
//! vocabulary of [`SectionKey`]s to text, plus an optional list of structured
//! [`ActionItem`]s when the source was JSON.

use crate::error::PriorityParseError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Known section names
///
/// Declaration order is the canonical display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKey {
    /// High-level overview of the outcome
    ExecutiveSummary,
    /// The recommended course of action
    Recommendation,
    /// Reasoning behind the recommendation
    Rationale,
    /// Risks and how to mitigate them
    RisksAndMitigations,
    /// Practical notes for carrying out the recommendation
    ImplementationConsiderations,
    /// How confident the panel is
    ConfidenceAssessment,
    /// Questions left unresolved
    OpenQuestions,
    /// Minority or dissenting positions
    DissentingViews,
    /// Raw fallback: the whole text when no structure was found
    Summary,
}

impl SectionKey {
    /// Every key, in canonical order
    pub const ALL: [SectionKey; 9] = [
        SectionKey::ExecutiveSummary,
        SectionKey::Recommendation,
        SectionKey::Rationale,
        SectionKey::RisksAndMitigations,
        SectionKey::ImplementationConsiderations,
        SectionKey::ConfidenceAssessment,
        SectionKey::OpenQuestions,
        SectionKey::DissentingViews,
        SectionKey::Summary,
    ];

    /// Stable snake_case name, used for tags and JSON field names
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKey::ExecutiveSummary => "executive_summary",
            SectionKey::Recommendation => "recommendation",
            SectionKey::Rationale => "rationale",
            SectionKey::RisksAndMitigations => "risks_and_mitigations",
            SectionKey::ImplementationConsiderations => "implementation_considerations",
            SectionKey::ConfidenceAssessment => "confidence_assessment",
            SectionKey::OpenQuestions => "open_questions",
            SectionKey::DissentingViews => "dissenting_views",
            SectionKey::Summary => "summary",
        }
    }

    /// Human-facing title
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            SectionKey::ExecutiveSummary => "Executive Summary",
            SectionKey::Recommendation => "Recommendation",
            SectionKey::Rationale => "Rationale",
            SectionKey::RisksAndMitigations => "Risks & Mitigations",
            SectionKey::ImplementationConsiderations => "Implementation Considerations",
            SectionKey::ConfidenceAssessment => "Confidence Assessment",
            SectionKey::OpenQuestions => "Open Questions",
            SectionKey::DissentingViews => "Dissenting Views",
            SectionKey::Summary => "Summary",
        }
    }

    /// Lowercase phrases that identify this key inside a heading
    ///
    /// [`SectionKey::Summary`] has none: it is only produced by the raw fallback.
    #[must_use]
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            SectionKey::ExecutiveSummary => &["executive summary", "tl dr", "tldr", "overview", "summary"],
            SectionKey::Recommendation => &["recommendation", "recommended approach", "decision"],
            SectionKey::Rationale => &["rationale", "reasoning", "justification"],
            SectionKey::RisksAndMitigations => &["risks and mitigations", "risk", "mitigation"],
            SectionKey::ImplementationConsiderations => &[
                "implementation considerations",
                "implementation",
                "next steps",
            ],
            SectionKey::ConfidenceAssessment => &["confidence assessment", "confidence"],
            SectionKey::OpenQuestions => &["open questions", "unresolved", "questions"],
            SectionKey::DissentingViews => &["dissenting views", "dissent", "minority view"],
            SectionKey::Summary => &[],
        }
    }

    /// Look up a key by its snake_case name (case-insensitive)
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Must happen immediately
    Critical,
    /// Important, near-term
    High,
    /// Default priority
    #[default]
    Medium,
    /// Nice to have
    Low,
}

impl Priority {
    /// Lowercase name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl FromStr for Priority {
    type Err = PriorityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Priority::Critical),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(PriorityParseError(other.to_string())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured recommended action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    /// Short imperative title
    pub title: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Why the action is recommended; may reference a scope ("sub-problem 2")
    pub rationale: String,
    /// Urgency
    pub priority: Priority,
    /// Free-form timeline ("2w", "Q3")
    pub timeline: String,
    /// How success is measured
    pub success_metrics: Vec<String>,
    /// Known risks
    pub risks: Vec<String>,
}

/// Extracted sections of one synthesis blob
///
/// Absence of a key means "not supplied", never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMap {
    sections: BTreeMap<SectionKey, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    actions: Option<Vec<ActionItem>>,
}

impl SectionMap {
    /// Create an empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map holding only the raw fallback section
    #[must_use]
    pub fn raw(text: &str) -> Self {
        let mut map = Self::new();
        map.sections.insert(SectionKey::Summary, text.to_string());
        map
    }

    /// Set a section, replacing any previous content
    pub fn insert(&mut self, key: SectionKey, content: impl Into<String>) {
        self.sections.insert(key, content.into());
    }

    /// Append to a section, separating repeated content with a blank line
    pub fn append(&mut self, key: SectionKey, content: &str) {
        self.sections
            .entry(key)
            .and_modify(|existing| {
                existing.push_str("\n\n");
                existing.push_str(content);
            })
            .or_insert_with(|| content.to_string());
    }

    /// Content of a section
    #[inline]
    #[must_use]
    pub fn get(&self, key: SectionKey) -> Option<&str> {
        self.sections.get(&key).map(String::as_str)
    }

    /// Whether a section is present
    #[inline]
    #[must_use]
    pub fn contains(&self, key: SectionKey) -> bool {
        self.sections.contains_key(&key)
    }

    /// Sections in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (SectionKey, &str)> {
        self.sections.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Structured actions, when the source carried them
    #[inline]
    #[must_use]
    pub fn actions(&self) -> Option<&[ActionItem]> {
        self.actions.as_deref()
    }

    /// Attach structured actions
    pub fn set_actions(&mut self, actions: Vec<ActionItem>) {
        self.actions = Some(actions);
    }

    /// Number of text sections
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// True when there are neither sections nor actions
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.actions.is_none()
    }

    /// True when the only content is the raw fallback section
    #[must_use]
    pub fn is_raw_only(&self) -> bool {
        self.actions.is_none()
            && self.sections.len() == 1
            && self.sections.contains_key(&SectionKey::Summary)
    }
}
