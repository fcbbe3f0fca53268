//! Request and response values passed through the pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

pub use crate::page::PageKind;

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
}

impl Method {
    /// Parses a form `method` attribute; HTML forms default to GET.
    #[must_use]
    pub fn from_form_attr(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(method) if method.eq_ignore_ascii_case("post") => Self::Post,
            _ => Self::Get,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered request parameters. GET sends them as the query string, POST as
/// a url-encoded form body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params(Vec<(String, String)>);

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a pair, keeping existing pairs with the same name.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Replaces the first pair named `name`, or appends one.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((name.to_string(), value)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    #[must_use]
    pub fn as_pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// One request issued through a connection. Built per call and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: Method,
    pub target: Url,
    pub params: Params,
    /// Page the caller expects on success; `None` discards the body.
    pub expected: Option<PageKind>,
}

impl RequestSpec {
    #[must_use]
    pub fn get(target: Url, params: Params, expected: Option<PageKind>) -> Self {
        Self {
            method: Method::Get,
            target,
            params,
            expected,
        }
    }
}

impl fmt::Display for RequestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.target)
    }
}

/// Final URL after redirects and the response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub final_url: Url,
    pub body: String,
}
