//! Error types for page extraction.

use thiserror::Error;

use super::PageKind;

/// Errors raised when a page no longer has the expected structure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    /// A required element or value is missing or unreadable.
    #[error("malformed {page} page: {reason}\n  Suggestion: {suggestion}")]
    MalformedDocument {
        /// Page being extracted.
        page: String,
        /// What did not match.
        reason: String,
        /// How to fix the issue.
        suggestion: &'static str,
    },
}

const LAYOUT_CHANGED: &str =
    "The site layout may have changed; re-run with -vv and report the page structure";

impl PageError {
    /// Creates a `MalformedDocument` error for a page kind.
    #[must_use]
    pub fn malformed(page: PageKind, reason: impl Into<String>) -> Self {
        Self::malformed_named(page.as_str(), reason)
    }

    /// Creates a `MalformedDocument` error for a page without a [`PageKind`]
    /// (error pages, login forms).
    #[must_use]
    pub fn malformed_named(page: &str, reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            page: page.to_string(),
            reason: reason.into(),
            suggestion: LAYOUT_CHANGED,
        }
    }

    /// Creates a `MalformedDocument` error for a missing element.
    #[must_use]
    pub fn missing(page: PageKind, selector: &str) -> Self {
        Self::malformed(page, format!("no element matches '{selector}'"))
    }
}
