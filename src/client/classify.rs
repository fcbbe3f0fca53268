//! Response classification.
//!
//! Decides what a transport result means before anything else looks at the
//! body. The checks run in a fixed order and the first match wins:
//!
//! 1. the region's login-error rule matches -> session error (login)
//! 2. the final URL is the canonical error page -> session or generic error
//!    by code
//! 3. the final URL is a login page -> login challenge
//! 4. anything else -> success

use scraper::Html;
use tracing::{debug, instrument};

use super::constants::{LOGIN_ERROR_CODE, SESSION_EXPIRED_CODE, SESSION_REFRESH_CODE};
use super::error::ClientError;
use super::request::RawResponse;
use crate::page::{PageError, html};
use crate::region::RegionConfig;

const ERROR_PAGE: &str = "error";
const ERROR_CODE_SELECTOR: &str = ".container_red > div";
const MAINTENANCE_MARKERS: [&str; 2] = ["maintenance", "メンテナンス"];

/// Session error subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionErrorKind {
    Login,
    SessionRefresh,
    SessionExpired,
}

impl SessionErrorKind {
    /// The error surfaced for this kind.
    #[must_use]
    pub fn error(self, code: u32) -> ClientError {
        match self {
            Self::Login => ClientError::Login { code },
            Self::SessionRefresh => ClientError::SessionRefresh { code },
            Self::SessionExpired => ClientError::SessionExpired { code },
        }
    }
}

/// Outcome of classifying one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Success,
    LoginChallenge,
    SessionError { kind: SessionErrorKind, code: u32 },
    GenericError(u32),
}

impl Classification {
    /// Converts error classifications into the matching [`ClientError`].
    #[must_use]
    pub fn into_error(self) -> Option<ClientError> {
        match self {
            Self::Success | Self::LoginChallenge => None,
            Self::SessionError { kind, code } => Some(kind.error(code)),
            Self::GenericError(code) => Some(ClientError::General { code }),
        }
    }
}

/// Classifies a response for `region`.
///
/// # Errors
///
/// - [`ClientError::Page`] when the error page carries no readable code.
/// - [`ClientError::UnderMaintenance`] when the error page announces
///   maintenance instead of a code.
#[instrument(level = "debug", skip_all, fields(final_url = %response.final_url))]
pub fn classify(
    region: &RegionConfig,
    response: &RawResponse,
) -> Result<Classification, ClientError> {
    let url = &response.final_url;

    let classification = if region.is_login_error(url, &response.body) {
        Classification::SessionError {
            kind: SessionErrorKind::Login,
            code: LOGIN_ERROR_CODE,
        }
    } else if region.is_error_page(url) {
        classify_code(parse_error_code(&response.body)?)
    } else if region.is_login_page(url) {
        Classification::LoginChallenge
    } else {
        Classification::Success
    };

    debug!(?classification, "response classified");
    Ok(classification)
}

/// Maps an error page code.
#[must_use]
pub fn classify_code(code: u32) -> Classification {
    let kind = match code {
        LOGIN_ERROR_CODE => SessionErrorKind::Login,
        SESSION_REFRESH_CODE => SessionErrorKind::SessionRefresh,
        SESSION_EXPIRED_CODE => SessionErrorKind::SessionExpired,
        _ => return Classification::GenericError(code),
    };
    Classification::SessionError { kind, code }
}

/// Reads the first integer of the error note.
fn parse_error_code(body: &str) -> Result<u32, ClientError> {
    let document = Html::parse_document(body);
    let note = html::first_in(ERROR_PAGE, &document, ERROR_CODE_SELECTOR)?.map(html::text);

    if let Some(code) = note.as_deref().and_then(html::get_padded_int) {
        return Ok(code);
    }

    let page_text = document.root_element().text().collect::<String>().to_lowercase();
    if MAINTENANCE_MARKERS.iter().any(|marker| page_text.contains(marker)) {
        return Err(ClientError::UnderMaintenance);
    }

    Err(PageError::malformed_named(
        ERROR_PAGE,
        match note {
            Some(note) => format!("no error code in '{note}'"),
            None => format!("no element matches '{ERROR_CODE_SELECTOR}'"),
        },
    )
    .into())
}
