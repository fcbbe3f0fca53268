//! Login handshake.
//!
//! When a request lands on a login page, the login form is filled in with
//! the stored credentials and submitted in place of the original request.
//! The submission keeps the original page expectation, so the page the
//! site redirects to after login is extracted as if requested directly.

use std::fmt;

use scraper::{ElementRef, Html};
use tracing::{debug, instrument};
use url::Url;

use super::constants::USERNAME_FIELDS;
use super::error::ClientError;
use super::request::{Method, Params, RequestSpec};
use crate::page::html;

const LOGIN_PAGE: &str = "login";
const FORM_SELECTOR: &str = "form[action][method]";
const PASSWORD_SELECTOR: &str = r#"input[type="password"]"#;
const SUBMITTED_INPUT_TYPES: [&str; 3] = ["text", "password", "hidden"];

/// Login id and password of a session.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Builds the login submission for a challenge page.
///
/// # Errors
///
/// - [`ClientError::UnsupportedLoginForm`] when the page has no POST form
///   with a password field, or the form has no known login id field.
/// - [`ClientError::InvalidUrl`] when the form action cannot be joined
///   onto `challenge_url`.
#[instrument(level = "debug", skip(body, original, credentials), fields(original = %original))]
pub fn handshake(
    challenge_url: &Url,
    body: &str,
    original: &RequestSpec,
    credentials: &Credentials,
) -> Result<RequestSpec, ClientError> {
    let document = Html::parse_document(body);
    let form = find_login_form(&document)?;

    let mut params = Params::new();
    let mut password_field = None;
    for input in html::all(LOGIN_PAGE, form, "input")? {
        let kind = input
            .value()
            .attr("type")
            .map_or_else(|| "text".to_string(), str::to_ascii_lowercase);
        if !SUBMITTED_INPUT_TYPES.contains(&kind.as_str()) {
            continue;
        }
        let Some(name) = input.value().attr("name") else {
            continue;
        };
        if kind == "password" && password_field.is_none() {
            password_field = Some(name.to_string());
        }
        params.set(name, input.value().attr("value").unwrap_or_default());
    }

    let username_field = USERNAME_FIELDS
        .iter()
        .find(|field| params.contains(field))
        .ok_or_else(|| {
            ClientError::unsupported_login_form(format!(
                "no login id field ({})",
                USERNAME_FIELDS.join(", ")
            ))
        })?;
    let password_field = password_field
        .ok_or_else(|| ClientError::unsupported_login_form("password field has no name"))?;

    params.set(username_field, credentials.username.as_str());
    params.set(&password_field, credentials.password.as_str());

    let action = form.value().attr("action").unwrap_or_default();
    let target = challenge_url
        .join(action)
        .map_err(|error| ClientError::invalid_url(action, error))?;
    let method = Method::from_form_attr(form.value().attr("method"));

    debug!(%method, %target, username_field, "login form filled");
    Ok(RequestSpec {
        method,
        target,
        params,
        expected: original.expected,
    })
}

/// The first form that posts and contains a password field.
fn find_login_form(document: &Html) -> Result<ElementRef<'_>, ClientError> {
    let form_selector = html::selector(LOGIN_PAGE, FORM_SELECTOR)?;
    let password = html::selector(LOGIN_PAGE, PASSWORD_SELECTOR)?;
    document
        .select(&form_selector)
        .filter(|form| Method::from_form_attr(form.value().attr("method")) == Method::Post)
        .find(|form| form.select(&password).next().is_some())
        .ok_or_else(|| ClientError::unsupported_login_form("no POST form with a password field"))
}
