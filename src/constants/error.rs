//! Error types for constant normalization.

use thiserror::Error;

use super::Dimension;

/// Errors raised while normalizing a filter or sort value.
///
/// Both variants are raised before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    /// A numeric id outside the legal id range of its dimension.
    #[error("invalid {dimension} id {value}\n  Suggestion: {suggestion}")]
    InvalidParameter {
        /// Dimension the value was normalized for.
        dimension: Dimension,
        /// The rejected value as given.
        value: String,
        /// How to fix the issue.
        suggestion: String,
    },

    /// A value that is neither a known id nor a resolvable symbolic key.
    #[error("unrecognized {dimension} value '{value}'\n  Suggestion: {suggestion}")]
    InvalidType {
        /// Dimension the value was normalized for.
        dimension: Dimension,
        /// The rejected value as given.
        value: String,
        /// How to fix the issue.
        suggestion: String,
    },
}

impl ParameterError {
    /// Creates an `InvalidParameter` error for an out-of-range id.
    #[must_use]
    pub fn out_of_range(dimension: Dimension, id: i64) -> Self {
        Self::InvalidParameter {
            dimension,
            value: id.to_string(),
            suggestion: format!("Use an id within {}", dimension.describe_ranges()),
        }
    }

    /// Creates an `InvalidParameter` error for a structurally invalid argument
    /// (empty selection, duplicate filter, wrong dimension).
    #[must_use]
    pub fn invalid(dimension: Dimension, value: impl Into<String>, suggestion: &str) -> Self {
        Self::InvalidParameter {
            dimension,
            value: value.into(),
            suggestion: suggestion.to_string(),
        }
    }

    /// Creates an `InvalidType` error for an unknown symbolic key.
    #[must_use]
    pub fn unknown_key(dimension: Dimension, key: &str) -> Self {
        Self::InvalidType {
            dimension,
            value: key.to_string(),
            suggestion: format!(
                "Use a {dimension} key or an id within {}",
                dimension.describe_ranges()
            ),
        }
    }

    /// Returns the dimension the rejected value belonged to.
    #[must_use]
    pub fn dimension(&self) -> Dimension {
        match self {
            Self::InvalidParameter { dimension, .. } | Self::InvalidType { dimension, .. } => {
                *dimension
            }
        }
    }
}
