//! Error types for the connection pipeline.
//!
//! [`ClientError`] is the taxonomy callers see. [`TransportError`] stays
//! below the pipeline: transient transport failures are wrapped in
//! [`ClientError::RequestRetry`] and consumed by the retry layer, permanent
//! ones surface as [`ClientError::Transport`].

use thiserror::Error;

use super::constants::SESSION_REFRESH_HINT;
use super::maintenance::MaintenanceWindow;
use crate::constants::ParameterError;
use crate::page::PageError;

/// Errors raised by the HTTP transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} requesting {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body could not be read as text.
    #[error("unreadable response body from {url}: {source}")]
    Body {
        /// The URL whose body failed.
        url: String,
        /// The underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

impl TransportError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }
}

/// Errors surfaced by [`super::Connection`] operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A transient transport failure; retried by the pipeline and never
    /// returned by a connection.
    #[error("transient failure: {0}")]
    RequestRetry(#[source] TransportError),

    /// Every attempt of one call failed transiently.
    #[error(
        "request failed after {attempts} attempts: {source}\n  Suggestion: Check your network connection or raise the retry limit"
    )]
    RetryExhausted {
        /// Transport calls made.
        attempts: u32,
        /// The last transient failure.
        #[source]
        source: TransportError,
    },

    /// The site rejected the stored credentials.
    #[error("login rejected (error {code})\n  Suggestion: Check the username and password")]
    Login { code: u32 },

    /// The session must be refreshed from the home page.
    #[error("{hint} (error {code})", hint = SESSION_REFRESH_HINT)]
    SessionRefresh { code: u32 },

    /// The session expired.
    #[error("session expired (error {code})\n  Suggestion: Log in again")]
    SessionExpired { code: u32 },

    /// Any other error page.
    #[error("Error {code}")]
    General { code: u32 },

    /// The call was made during the daily maintenance window.
    #[error("Maintenance from {0}.")]
    RoutineMaintenance(MaintenanceWindow),

    /// The site announced maintenance on its error page.
    #[error("the site is under maintenance\n  Suggestion: Try again later")]
    UnderMaintenance,

    /// A filter or sort value failed normalization.
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    /// A page no longer has the expected structure.
    #[error(transparent)]
    Page(#[from] PageError),

    /// The login page has no form this client can fill in.
    #[error(
        "unsupported login form: {reason}\n  Suggestion: The login page layout may have changed"
    )]
    UnsupportedLoginForm { reason: String },

    /// A permanent transport failure.
    #[error(transparent)]
    Transport(TransportError),

    /// A route or form target could not be turned into a URL.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ClientError {
    #[must_use]
    pub fn unsupported_login_form(reason: impl Into<String>) -> Self {
        Self::UnsupportedLoginForm {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Login, session refresh and session expiry errors.
    #[must_use]
    pub fn is_session_error(&self) -> bool {
        matches!(
            self,
            Self::Login { .. } | Self::SessionRefresh { .. } | Self::SessionExpired { .. }
        )
    }

    /// Routine or announced maintenance.
    #[must_use]
    pub fn is_maintenance(&self) -> bool {
        matches!(self, Self::RoutineMaintenance(_) | Self::UnderMaintenance)
    }

    /// Website error code, when the error came from an error page.
    #[must_use]
    pub fn code(&self) -> Option<u32> {
        match self {
            Self::Login { code }
            | Self::SessionRefresh { code }
            | Self::SessionExpired { code }
            | Self::General { code } => Some(*code),
            _ => None,
        }
    }

    /// Parameter errors are raised before any network call.
    #[must_use]
    pub fn is_parameter_error(&self) -> bool {
        matches!(self, Self::Parameter(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_refresh_message_carries_hint() {
        let err = ClientError::SessionRefresh { code: 200_002 };
        let message = err.to_string();
        assert!(message.contains("home page"), "{message}");
        assert!(message.contains("200002"), "{message}");
        assert!(err.is_session_error());
        assert_eq!(err.code(), Some(200_002));
    }

    #[test]
    fn test_error_predicates() {
        assert!(ClientError::UnderMaintenance.is_maintenance());
        assert!(!ClientError::General { code: 1 }.is_session_error());
        assert!(ClientError::Login { code: 100_101 }.is_session_error());
        assert_eq!(ClientError::UnderMaintenance.code(), None);
    }

    #[test]
    fn test_retry_exhausted_display() {
        let err = ClientError::RetryExhausted {
            attempts: 4,
            source: TransportError::timeout("https://maimaidx.jp/maimai-mobile/home/"),
        };
        let message = err.to_string();
        assert!(message.contains("4 attempts"), "{message}");
        assert!(message.contains("timeout"), "{message}");
    }
}
