//! Scope filtering for recommended actions
//!
//! A deliberation may split into several parallel sub-problems. Actions do not
//! carry a structural scope field, so scope is inferred from numeric references
//! in the action's rationale ("applies to sub-problem 2"). This is a text
//! heuristic:
//! - no scope requested: every action is shown
//! - rationale without any scope reference: shown in every scope
//! - otherwise: shown only where a reference equals `scope_index + 1`
//!
//! Plural forms list several scopes ("sub-problems 2 and 3").

use crate::section::ActionItem;
use once_cell::sync::Lazy;
use regex::Regex;

static SCOPE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:sub[\s_-]?problems?|focus\s+areas?|areas?|scopes?)\s*#?\s*(\d+(?:\s*(?:,\s*(?:and|or)?|and|or|&)\s*#?\s*\d+)*)",
    )
    .expect("scope reference pattern is a compile-time constant")
});

/// 1-indexed scope numbers referenced by an action's rationale
#[must_use]
pub fn scope_references(action: &ActionItem) -> Vec<usize> {
    let mut refs: Vec<usize> = SCOPE_REFERENCE
        .captures_iter(&action.rationale)
        .filter_map(|caps| caps.get(1))
        .flat_map(|list| {
            list.as_str()
                .split(|c: char| !c.is_ascii_digit())
                .filter_map(|number| number.parse().ok())
                .collect::<Vec<usize>>()
        })
        .collect();
    refs.sort_unstable();
    refs.dedup();
    refs
}

/// Whether `action` belongs to the 0-indexed `scope`
#[must_use]
pub fn in_scope(action: &ActionItem, scope: Option<usize>) -> bool {
    let Some(scope) = scope else {
        return true;
    };
    let refs = scope_references(action);
    refs.is_empty() || refs.iter().any(|r| r.checked_sub(1) == Some(scope))
}

/// Actions visible in the 0-indexed `scope`, preserving order
#[must_use]
pub fn filter_actions(actions: &[ActionItem], scope: Option<usize>) -> Vec<&ActionItem> {
    actions.iter().filter(|a| in_scope(a, scope)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::Priority;

    fn action(title: &str, rationale: &str) -> ActionItem {
        ActionItem {
            title: title.to_string(),
            description: None,
            rationale: rationale.to_string(),
            priority: Priority::High,
            timeline: "2w".to_string(),
            success_metrics: Vec::new(),
            risks: Vec::new(),
        }
    }

    #[test]
    fn references_are_parsed_in_several_spellings() {
        assert_eq!(scope_references(&action("a", "applies to sub-problem 2")), vec![2]);
        assert_eq!(scope_references(&action("a", "Subproblem #3 and SUB PROBLEM 1")), vec![1, 3]);
        assert_eq!(scope_references(&action("a", "focus area 4")), vec![4]);
        assert!(scope_references(&action("a", "reduces cost by 40%")).is_empty());
    }

    #[test]
    fn scope_and_area_spellings() {
        assert_eq!(scope_references(&action("a", "only within scope 3")), vec![3]);
        assert_eq!(scope_references(&action("a", "see Area #2")), vec![2]);
        assert_eq!(scope_references(&action("a", "scope_5 is unrelated")), Vec::<usize>::new());
    }

    #[test]
    fn plural_references_list_every_number() {
        assert_eq!(scope_references(&action("a", "covers sub-problems 2 and 3")), vec![2, 3]);
        assert_eq!(scope_references(&action("a", "focus areas 1, 4, and 5")), vec![1, 4, 5]);

        let actions = vec![action("shared", "covers sub-problems 2 and 3")];
        assert!(filter_actions(&actions, Some(0)).is_empty());
        assert_eq!(filter_actions(&actions, Some(2)).len(), 1);
    }

    #[test]
    fn extreme_scope_index_does_not_overflow() {
        let actions = vec![action("a", "applies to sub-problem 2"), action("b", "general")];
        let titles: Vec<_> = filter_actions(&actions, Some(usize::MAX))
            .into_iter()
            .map(|a| a.title.as_str())
            .collect();
        assert_eq!(titles, vec!["b"]);

        let zero = vec![action("z", "sub-problem 0")];
        assert!(filter_actions(&zero, Some(0)).is_empty());
    }

    #[test]
    fn no_scope_shows_everything() {
        let actions = vec![action("a", "sub-problem 2"), action("b", "general")];
        assert_eq!(filter_actions(&actions, None).len(), 2);
    }

    #[test]
    fn scope_index_is_zero_based() {
        let actions = vec![action("a", "applies to sub-problem 2")];
        assert!(filter_actions(&actions, Some(0)).is_empty());
        assert_eq!(filter_actions(&actions, Some(1)).len(), 1);
    }

    #[test]
    fn unreferenced_actions_appear_in_every_scope() {
        let actions = vec![
            action("general", "helps overall"),
            action("first", "sub-problem 1"),
            action("second", "sub-problem 2"),
        ];
        let titles: Vec<_> = filter_actions(&actions, Some(1))
            .into_iter()
            .map(|a| a.title.as_str())
            .collect();
        assert_eq!(titles, vec!["general", "second"]);
    }
}
