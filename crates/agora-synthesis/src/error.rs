//! Error types for synthesis extraction
//!
//! Extraction itself is total and never fails; these errors only surface from
//! the strict parsing helpers.

/// Unrecognized priority label
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown priority: '{0}'")]
pub struct PriorityParseError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_error_display() {
        let err = PriorityParseError("urgent".to_string());
        assert_eq!(err.to_string(), "unknown priority: 'urgent'");
    }
}
