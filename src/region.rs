//! Deployment targets of the player site.
//!
//! A [`RegionConfig`] carries the host, the canonical error page and the rules
//! used to recognise login pages. It is passed by value into a connection.

use std::fmt;
use std::sync::LazyLock;

use chrono::{FixedOffset, Offset, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use url::Url;

const WEBSITE_PATH: &str = "/maimai-mobile";

/// Both regions run on Japan Standard Time.
const SERVICE_UTC_OFFSET_SECS: i32 = 9 * 3600;

/// Fixed timezone of the service (UTC+09:00).
#[must_use]
pub fn service_timezone() -> FixedOffset {
    FixedOffset::east_opt(SERVICE_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Matches `<tag ...>Error</tag>`; the tag names are compared afterwards.
#[allow(clippy::expect_used)]
static ERROR_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<([^\s>/]+)(?:\s+[^>]+)?>Error</([^\s>]+)>")
        .expect("error element pattern is valid")
});

/// Known server regions.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Region {
    #[default]
    Japan,
    #[strum(to_string = "asia", serialize = "international", serialize = "intl")]
    Asia,
}

/// How a region recognises its login page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginPageRule {
    /// The website root (`/maimai-mobile` or `/maimai-mobile/`) on the region host.
    WebsiteRoot,
    /// An external authentication host.
    ExternalAuth {
        host_suffix: String,
        path_segments: Vec<String>,
    },
}

/// How a region recognises a rejected login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginErrorRule {
    /// Login page whose body contains an element reading `Error`.
    ErrorElementOnLoginPage,
}

/// Per-region constants and predicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionConfig {
    region: Region,
    base_host: Url,
    login_page: LoginPageRule,
    login_error: Option<LoginErrorRule>,
}

impl RegionConfig {
    /// Japan server: `https://maimaidx.jp`.
    #[must_use]
    pub fn japan() -> Self {
        Self::with_host(Region::Japan, "https://maimaidx.jp")
    }

    /// Asia server: `https://maimaidx-eng.com`, authenticating on `*.am-all.net`.
    #[must_use]
    pub fn asia() -> Self {
        Self::with_host(Region::Asia, "https://maimaidx-eng.com")
    }

    #[must_use]
    pub fn for_region(region: Region) -> Self {
        match region {
            Region::Japan => Self::japan(),
            Region::Asia => Self::asia(),
        }
    }

    fn with_host(region: Region, host: &'static str) -> Self {
        let base_host = match Url::parse(host) {
            Ok(url) => url,
            Err(error) => unreachable!("static region host {host} failed to parse: {error}"),
        };
        let (login_page, login_error) = match region {
            Region::Japan => (LoginPageRule::WebsiteRoot, None),
            Region::Asia => (
                LoginPageRule::ExternalAuth {
                    host_suffix: ".am-all.net".to_string(),
                    path_segments: vec!["common_auth".to_string(), "login".to_string()],
                },
                Some(LoginErrorRule::ErrorElementOnLoginPage),
            ),
        };
        Self {
            region,
            base_host,
            login_page,
            login_error,
        }
    }

    /// Re-points the region at another host, keeping its rules.
    ///
    /// # Errors
    ///
    /// Returns an error when `host` is not an absolute URL.
    pub fn with_base_host(mut self, host: &str) -> Result<Self, url::ParseError> {
        let mut url = Url::parse(host)?;
        url.set_path("");
        url.set_query(None);
        url.set_fragment(None);
        self.base_host = url;
        Ok(self)
    }

    /// Replaces the external authentication host suffix (Asia only).
    #[must_use]
    pub fn with_login_host_suffix(mut self, suffix: &str) -> Self {
        if let LoginPageRule::ExternalAuth { host_suffix, .. } = &mut self.login_page {
            *host_suffix = suffix.to_string();
        }
        self
    }

    #[must_use]
    pub fn region(&self) -> Region {
        self.region
    }

    #[must_use]
    pub fn base_host(&self) -> &Url {
        &self.base_host
    }

    #[must_use]
    pub fn login_page_rule(&self) -> &LoginPageRule {
        &self.login_page
    }

    #[must_use]
    pub fn login_error_rule(&self) -> Option<LoginErrorRule> {
        self.login_error
    }

    /// `{base_host}/maimai-mobile/`.
    #[must_use]
    pub fn website_base(&self) -> Url {
        let mut url = self.base_host.clone();
        url.set_path(&format!("{WEBSITE_PATH}/"));
        url
    }

    /// `{base_host}/maimai-mobile/error/`.
    #[must_use]
    pub fn error_page(&self) -> Url {
        let mut url = self.base_host.clone();
        url.set_path(&format!("{WEBSITE_PATH}/error/"));
        url
    }

    /// Resolves a path relative to the website base (`home/` -> `/maimai-mobile/home/`).
    ///
    /// # Errors
    ///
    /// Returns an error when the path cannot be joined.
    pub fn url_for(&self, path: &str) -> Result<Url, url::ParseError> {
        self.website_base().join(path.trim_start_matches('/'))
    }

    /// Returns true for the canonical error page, ignoring query and fragment.
    #[must_use]
    pub fn is_error_page(&self, url: &Url) -> bool {
        let error_page = self.error_page();
        same_origin(url, &error_page) && url.path() == error_page.path()
    }

    #[must_use]
    pub fn is_login_page(&self, url: &Url) -> bool {
        match &self.login_page {
            LoginPageRule::WebsiteRoot => {
                same_origin(url, &self.base_host)
                    && (url.path() == WEBSITE_PATH || url.path() == format!("{WEBSITE_PATH}/"))
            }
            LoginPageRule::ExternalAuth {
                host_suffix,
                path_segments,
            } => {
                let host_matches = url
                    .host_str()
                    .is_some_and(|host| host.ends_with(host_suffix.as_str()));
                let segments: Vec<&str> = url
                    .path_segments()
                    .map(|segments| segments.take(path_segments.len()).collect())
                    .unwrap_or_default();
                host_matches && segments == *path_segments
            }
        }
    }

    /// Returns true when the response reports rejected credentials.
    ///
    /// Always false for regions without a login-error rule.
    #[must_use]
    pub fn is_login_error(&self, url: &Url, body: &str) -> bool {
        match self.login_error {
            Some(LoginErrorRule::ErrorElementOnLoginPage) => {
                self.is_login_page(url) && contains_error_element(body)
            }
            None => false,
        }
    }

    /// Returns true when `url` is the website base or below it.
    #[must_use]
    pub fn contains(&self, url: &Url) -> bool {
        let path = url.path();
        same_origin(url, &self.base_host)
            && (path == WEBSITE_PATH || path.starts_with(&format!("{WEBSITE_PATH}/")))
    }
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self::japan()
    }
}

impl fmt::Display for RegionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.region, self.base_host)
    }
}

/// Guesses the region a URL belongs to, by website base or login page.
#[must_use]
pub fn guess(url: &Url) -> Option<Region> {
    Region::iter()
        .map(RegionConfig::for_region)
        .find(|config| config.contains(url) || config.is_login_page(url))
        .map(|config| config.region())
}

fn same_origin(left: &Url, right: &Url) -> bool {
    left.scheme() == right.scheme()
        && left.host_str() == right.host_str()
        && left.port_or_known_default() == right.port_or_known_default()
        && left.username() == right.username()
}

fn contains_error_element(body: &str) -> bool {
    ERROR_ELEMENT.captures_iter(body).any(|captures| {
        match (captures.get(1), captures.get(2)) {
            (Some(open), Some(close)) => open.as_str().eq_ignore_ascii_case(close.as_str()),
            _ => false,
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn test_website_paths() {
        let japan = RegionConfig::japan();
        assert_eq!(japan.website_base().as_str(), "https://maimaidx.jp/maimai-mobile/");
        assert_eq!(japan.error_page().as_str(), "https://maimaidx.jp/maimai-mobile/error/");
        assert_eq!(
            japan.url_for("/record/musicGenre/search/").unwrap().as_str(),
            "https://maimaidx.jp/maimai-mobile/record/musicGenre/search/"
        );
    }

    #[test]
    fn test_japan_login_page_is_website_root() {
        let japan = RegionConfig::japan();
        assert!(japan.is_login_page(&url("https://maimaidx.jp/maimai-mobile/")));
        assert!(japan.is_login_page(&url("https://maimaidx.jp/maimai-mobile")));
        assert!(!japan.is_login_page(&url("https://maimaidx.jp/maimai-mobile/home/")));
        assert!(!japan.is_login_page(&url("https://maimaidx-eng.com/maimai-mobile/")));
        assert!(!japan.is_login_error(&url("https://maimaidx.jp/maimai-mobile/"), "<p>Error</p>"));
    }

    #[test]
    fn test_asia_login_page_rule() {
        let asia = RegionConfig::asia();
        let auth = "https://lng-tgk-aime-gw.am-all.net/common_auth";
        assert!(asia.is_login_page(&url(&format!("{auth}/login?site_id=x"))));
        assert!(asia.is_login_page(&url(&format!("{auth}/login/sid/"))));
        assert!(!asia.is_login_page(&url(&format!("{auth}/logout"))));
        assert!(!asia.is_login_page(&url("https://am-all.net.example.com/common_auth/login")));
        assert!(!asia.is_login_page(&url("https://maimaidx-eng.com/maimai-mobile/")));
    }

    #[test]
    fn test_asia_login_error_requires_matching_tags() {
        let asia = RegionConfig::asia();
        let login = url("https://lng-tgk-aime-gw.am-all.net/common_auth/login/sid/");
        assert!(asia.is_login_error(&login, r#"<div><p class="t">ERROR</p></div>"#));
        assert!(asia.is_login_error(&login, "<span>Error</span>"));
        assert!(!asia.is_login_error(&login, "<p>Error</span>"));
        assert!(!asia.is_login_error(&login, "<p>Errors</p>"));
        let home = url("https://maimaidx-eng.com/maimai-mobile/home/");
        assert!(!asia.is_login_error(&home, "<p>Error</p>"));
    }

    #[test]
    fn test_error_page_ignores_query() {
        let japan = RegionConfig::japan();
        assert!(japan.is_error_page(&url("https://maimaidx.jp/maimai-mobile/error/?e=1")));
        assert!(!japan.is_error_page(&url("https://maimaidx.jp/maimai-mobile/error")));
    }

    #[test]
    fn test_guess_region() {
        assert_eq!(guess(&url("https://maimaidx.jp/maimai-mobile/home/")), Some(Region::Japan));
        assert_eq!(guess(&url("https://maimaidx-eng.com/maimai-mobile")), Some(Region::Asia));
        assert_eq!(
            guess(&url("https://lng-tgk-aime-gw.am-all.net/common_auth/login")),
            Some(Region::Asia)
        );
        assert_eq!(guess(&url("https://maimaidx.jp/maimai-mobilex")), None);
        assert_eq!(guess(&url("https://example.com/")), None);
    }

    #[test]
    fn test_with_base_host_keeps_rules() {
        let local = RegionConfig::japan().with_base_host("http://127.0.0.1:8080/ignored").unwrap();
        assert_eq!(local.region(), Region::Japan);
        assert_eq!(local.error_page().as_str(), "http://127.0.0.1:8080/maimai-mobile/error/");
        assert!(local.is_login_page(&url("http://127.0.0.1:8080/maimai-mobile/")));
    }

    #[test]
    fn test_region_from_str() {
        assert_eq!("ASIA".parse::<Region>().unwrap(), Region::Asia);
        assert_eq!("intl".parse::<Region>().unwrap(), Region::Asia);
        assert_eq!(Region::Japan.to_string(), "japan");
    }
}
