//! Structured JSON detection
//!
//! Upstream models often emit a JSON object followed by a `---` separator and
//! prose. The object is located with a string-aware brace counter so braces
//! inside string values never shift the nesting depth, then parsed with
//! `serde_json`.
//!
//! When text before the `---` separator holds no usable object, the whole text
//! is scanned again. A `{` that is not followed by a key or `}` is prose and is
//! skipped. A prose `{"` that never closes still reads as truncated JSON and
//! ends detection, so stray quoted braces before the real object are a known
//! limitation.

use crate::detect::{structured_key, ExtractionKind, SectionDetector};
use crate::section::{ActionItem, Priority, SectionMap};
use serde_json::{Map, Value};

/// Fields that hold the recommended action list
const ACTION_FIELDS: [&str; 2] = ["recommended_actions", "actions"];

/// Candidate objects tried before giving up
const MAX_CANDIDATES: usize = 16;

/// Detects JSON objects with recommended actions or known section fields
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDetector;

impl SectionDetector for JsonDetector {
    fn kind(&self) -> ExtractionKind {
        ExtractionKind::Json
    }

    fn detect(&self, text: &str) -> Option<SectionMap> {
        match closing_marker(text) {
            Some(end) if text[..end].contains('{') => {
                scan_region(&text[..end]).or_else(|| scan_region(text))
            }
            _ => scan_region(text),
        }
    }

    fn priority(&self) -> i32 {
        30
    }
}

/// Try candidate objects in `region`, left to right
fn scan_region(region: &str) -> Option<SectionMap> {
    let mut offset = 0;
    for _ in 0..MAX_CANDIDATES {
        let rest = &region[offset..];
        let start = rest.find('{')?;
        if !opens_object(&rest[start + 1..]) {
            offset += start + 1;
            continue;
        }
        let Some(candidate) = find_balanced_object(&rest[start..]) else {
            // Unbalanced from here on: truncated input
            return None;
        };
        if let Some(sections) = parse_candidate(candidate) {
            return Some(sections);
        }
        offset += start + 1;
    }
    None
}

/// A JSON object continues with a key or closes immediately
fn opens_object(after_brace: &str) -> bool {
    match after_brace.trim_start().chars().next() {
        Some('"' | '}') | None => true,
        Some(_) => false,
    }
}

/// Return the first balanced `{…}` object in `text`
///
/// Scanning starts at the first `{`. Quotes toggle string mode and a backslash
/// escapes the next byte inside strings. Returns `None` when the input ends
/// before the depth returns to zero.
#[must_use]
pub fn find_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    // Delimiters are ASCII, so byte positions are char boundaries
    for (i, byte) in text.as_bytes()[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if *byte == b'\\' {
                escaped = true;
            } else if *byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[start..=start + i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Byte offset of the first line consisting solely of `---`
fn closing_marker(text: &str) -> Option<usize> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim() == "---" {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

fn parse_candidate(candidate: &str) -> Option<SectionMap> {
    let Ok(Value::Object(object)) = serde_json::from_str::<Value>(candidate) else {
        return None;
    };

    let mut sections = SectionMap::new();

    let actions: Vec<ActionItem> = ACTION_FIELDS
        .iter()
        .find_map(|field| object.get(*field).and_then(Value::as_array))
        .map(|items| items.iter().filter_map(parse_action).collect())
        .unwrap_or_default();
    if !actions.is_empty() {
        sections.set_actions(actions);
    }

    for (field, value) in &object {
        let Some(key) = structured_key(field) else {
            continue;
        };
        if let Some(text) = section_text(value) {
            sections.insert(key, text);
        }
    }

    if sections.is_empty() {
        None
    } else {
        Some(sections)
    }
}

fn section_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => {
            let bullets: Vec<String> = string_list(items)
                .into_iter()
                .map(|item| format!("- {item}"))
                .collect();
            if bullets.is_empty() {
                None
            } else {
                Some(bullets.join("\n"))
            }
        }
        _ => None,
    }
}

fn parse_action(value: &Value) -> Option<ActionItem> {
    let object = value.as_object()?;
    let title = text_field(object, "title").or_else(|| text_field(object, "action"))?;

    let priority = text_field(object, "priority")
        .and_then(|p| p.parse::<Priority>().ok())
        .unwrap_or_default();

    let timeline = match object.get("timeline") {
        Some(Value::Number(n)) => n.to_string(),
        _ => text_field(object, "timeline").unwrap_or_default(),
    };

    Some(ActionItem {
        title,
        description: text_field(object, "description"),
        rationale: text_field(object, "rationale").unwrap_or_default(),
        priority,
        timeline,
        success_metrics: list_field(object, "success_metrics"),
        risks: list_field(object, "risks"),
    })
}

fn text_field(object: &Map<String, Value>, field: &str) -> Option<String> {
    object
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn list_field(object: &Map<String, Value>, field: &str) -> Vec<String> {
    match object.get(field) {
        Some(Value::Array(items)) => string_list(items),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

fn string_list(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::SectionKey;

    #[test]
    fn balanced_object_simple() {
        assert_eq!(find_balanced_object(r#"x {"a": 1} y"#), Some(r#"{"a": 1}"#));
    }

    #[test]
    fn balanced_object_nested() {
        let text = r#"{"a": {"b": {"c": 1}}, "d": 2} trailing }"#;
        assert_eq!(find_balanced_object(text), Some(r#"{"a": {"b": {"c": 1}}, "d": 2}"#));
    }

    #[test]
    fn balanced_object_ignores_braces_in_strings() {
        let text = r#"{"rationale":"uses a \"{placeholder}\" token"} after"#;
        assert_eq!(
            find_balanced_object(text),
            Some(r#"{"rationale":"uses a \"{placeholder}\" token"}"#)
        );
    }

    #[test]
    fn balanced_object_escaped_backslash_before_quote() {
        let text = r#"{"path":"C:\\","next":"}"}"#;
        assert_eq!(find_balanced_object(text), Some(text));
    }

    #[test]
    fn balanced_object_truncated() {
        assert_eq!(find_balanced_object(r#"{"recommended_actions": [ { "action": "A"#), None);
        assert_eq!(find_balanced_object("no braces here"), None);
    }

    #[test]
    fn closing_marker_found_on_own_line() {
        let text = "{\"a\":1}\n\n---\nprose";
        assert_eq!(closing_marker(text), Some(9));
        assert_eq!(closing_marker("a --- b"), None);
    }

    #[test]
    fn detects_actions_and_sibling_sections() {
        let text = r#"```json
{
  "executive_summary": "Adopt the phased plan.",
  "recommendation": "Ship v2 behind a flag",
  "recommended_actions": [
    {"title": "Enable flag", "rationale": "low risk", "priority": "CRITICAL",
     "timeline": "1w", "success_metrics": ["error rate < 1%"], "risks": ["rollback cost"]},
    {"description": "no title, skipped"}
  ]
}
```"#;
        let sections = JsonDetector.detect(text).unwrap();
        assert_eq!(sections.get(SectionKey::ExecutiveSummary), Some("Adopt the phased plan."));
        assert_eq!(sections.get(SectionKey::Recommendation), Some("Ship v2 behind a flag"));

        let actions = sections.actions().unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].title, "Enable flag");
        assert_eq!(actions[0].priority, Priority::Critical);
        assert_eq!(actions[0].success_metrics, vec!["error rate < 1%".to_string()]);
    }

    #[test]
    fn array_sections_become_bullets() {
        let sections = JsonDetector
            .detect(r#"{"risks_and_mitigations": ["vendor lock-in", "", "cost"]}"#)
            .unwrap();
        assert_eq!(
            sections.get(SectionKey::RisksAndMitigations),
            Some("- vendor lock-in\n- cost")
        );
    }

    #[test]
    fn unknown_priority_defaults_to_medium() {
        let sections = JsonDetector
            .detect(r#"{"actions":[{"action":"Do it","priority":"whenever","timeline":3}]}"#)
            .unwrap();
        let action = &sections.actions().unwrap()[0];
        assert_eq!(action.priority, Priority::Medium);
        assert_eq!(action.timeline, "3");
    }

    #[test]
    fn skips_unrelated_object_before_real_one() {
        let text = r#"Config {"mode": "fast"} then {"rationale": "because"}"#;
        let sections = JsonDetector.detect(text).unwrap();
        assert_eq!(sections.get(SectionKey::Rationale), Some("because"));
    }

    #[test]
    fn object_without_known_fields_is_no_match() {
        assert!(JsonDetector.detect(r#"{"foo": "bar"}"#).is_none());
        assert!(JsonDetector.detect(r#"{"recommended_actions": []}"#).is_none());
    }

    #[test]
    fn marker_bounds_the_region() {
        let text = "{\"rationale\":\"r\"}\n\n---\n\nprose with { stray brace";
        let sections = JsonDetector.detect(text).unwrap();
        assert_eq!(sections.get(SectionKey::Rationale), Some("r"));
    }

    #[test]
    fn object_after_marker_is_found_when_prose_has_braces() {
        let text = "Options {A, B} were weighed.\n\n---\n\n{\"recommended_actions\":[{\"action\":\"Do X\",\"rationale\":\"r\"}]}";
        let sections = JsonDetector.detect(text).unwrap();
        let actions = sections.actions().unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].title, "Do X");
    }

    #[test]
    fn stray_prose_brace_is_skipped() {
        let text = r#"Use the `{` char carefully. {"recommended_actions":[{"action":"Escape it","rationale":"r"}]}"#;
        let sections = JsonDetector.detect(text).unwrap();
        assert_eq!(sections.actions().map(<[_]>::len), Some(1));
    }

    #[test]
    fn truncated_object_after_prose_brace_is_no_match() {
        let text = r#"Use {x} here. {"recommended_actions":[{"action":"A","rationale":"r"}"#;
        assert!(JsonDetector.detect(text).is_none());
    }
}
