//! Task status codes.
//!
//! The set of codes is configured by the backend rather than fixed at
//! compile time, so a status is a string newtype. The five canonical codes
//! are available as associated constants and drive the transition rules.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A task status code, e.g. `IN_PROGRESS`. One board column per code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCode(Cow<'static, str>);

impl StatusCode {
    /// Work not started
    pub const PLANNING: StatusCode = StatusCode(Cow::Borrowed("PLANNING"));
    /// Work under way
    pub const IN_PROGRESS: StatusCode = StatusCode(Cow::Borrowed("IN_PROGRESS"));
    /// Awaiting review
    pub const IN_REVIEW: StatusCode = StatusCode(Cow::Borrowed("IN_REVIEW"));
    /// Done (terminal)
    pub const COMPLETED: StatusCode = StatusCode(Cow::Borrowed("COMPLETED"));
    /// Abandoned (terminal)
    pub const CANCELED: StatusCode = StatusCode(Cow::Borrowed("CANCELED"));

    /// Create a status code. Input is trimmed and upper-cased.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(Cow::Owned(code.as_ref().trim().to_ascii_uppercase()))
    }

    /// The canonical five codes, in board order.
    pub fn canonical() -> Vec<StatusCode> {
        vec![
            Self::PLANNING,
            Self::IN_PROGRESS,
            Self::IN_REVIEW,
            Self::COMPLETED,
            Self::CANCELED,
        ]
    }

    /// Raw code string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// COMPLETED or CANCELED.
    pub fn is_terminal(&self) -> bool {
        *self == Self::COMPLETED || *self == Self::CANCELED
    }

    /// Human-readable form: lowercase, underscores to spaces, first letter
    /// capitalized (`IN_REVIEW` -> `In review`).
    pub fn humanize(&self) -> String {
        let lower = self.0.to_lowercase().replace('_', " ");
        let mut chars = lower.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Translation key for this code's label.
    pub fn label_key(&self) -> String {
        format!("statusLabel.{}", self.0)
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for StatusCode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for StatusCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owned_and_const_compare_equal() {
        assert_eq!(StatusCode::new("in_progress"), StatusCode::IN_PROGRESS);
        assert_eq!(StatusCode::from(" COMPLETED "), StatusCode::COMPLETED);
    }

    #[test]
    fn test_humanize() {
        assert_eq!(StatusCode::IN_REVIEW.humanize(), "In review");
        assert_eq!(StatusCode::PLANNING.humanize(), "Planning");
        assert_eq!(StatusCode::new("").humanize(), "");
    }

    #[test]
    fn test_terminal() {
        assert!(StatusCode::COMPLETED.is_terminal());
        assert!(StatusCode::CANCELED.is_terminal());
        assert!(!StatusCode::IN_REVIEW.is_terminal());
    }

    #[test]
    fn test_serde_is_plain_string() {
        let json = serde_json::to_string(&StatusCode::IN_PROGRESS).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
        let back: StatusCode = serde_json::from_str("\"CANCELED\"").unwrap();
        assert_eq!(back, StatusCode::CANCELED);
    }
}
