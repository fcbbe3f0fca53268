//! HTTP transport.
//!
//! The [`Transport`] trait is the lowest seam of the pipeline: it sends one
//! request, follows redirects and reports the final URL and body. The
//! reqwest-backed [`HttpTransport`] owns the session cookie jar.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, redirect};
use tracing::{debug, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, MAX_REDIRECTS, READ_TIMEOUT_SECS};
use super::error::TransportError;
use super::request::{Method, Params, RawResponse};
use crate::user_agent;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Sends one HTTP request.
///
/// This trait uses `async_trait` so connections can be built over
/// `Box<dyn Transport>` as well as concrete transports.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues `method url` with `params` and returns the final URL and body.
    async fn execute(
        &self,
        method: Method,
        url: &Url,
        params: &Params,
    ) -> Result<RawResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn execute(
        &self,
        method: Method,
        url: &Url,
        params: &Params,
    ) -> Result<RawResponse, TransportError> {
        (**self).execute(method, url, params).await
    }
}

/// Timeouts for [`HttpTransport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportOptions {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(READ_TIMEOUT_SECS),
        }
    }
}

/// reqwest transport with a session cookie jar.
///
/// The jar is shared with nothing else; one transport belongs to one
/// connection.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    cookies: Arc<Jar>,
}

impl HttpTransport {
    /// Creates a transport with an empty cookie jar.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Build`] when the HTTP client cannot be built.
    pub fn new(options: TransportOptions) -> Result<Self, TransportError> {
        Self::with_cookie_jar(Arc::new(Jar::default()), options)
    }

    /// Creates a transport over an existing cookie jar.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Build`] when the HTTP client cannot be built.
    #[instrument(level = "debug", skip(cookies))]
    pub fn with_cookie_jar(
        cookies: Arc<Jar>,
        options: TransportOptions,
    ) -> Result<Self, TransportError> {
        let client = build_client(Arc::clone(&cookies), options).map_err(TransportError::Build)?;
        Ok(Self { client, cookies })
    }

    /// The session cookie jar.
    #[must_use]
    pub fn cookie_jar(&self) -> &Arc<Jar> {
        &self.cookies
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(level = "debug", skip(self, params), fields(%method, %url))]
    async fn execute(
        &self,
        method: Method,
        url: &Url,
        params: &Params,
    ) -> Result<RawResponse, TransportError> {
        let request = match method {
            Method::Get => {
                let mut target = url.clone();
                if !params.is_empty() {
                    target.query_pairs_mut().extend_pairs(params.iter());
                }
                self.client.get(target)
            }
            Method::Post => self
                .client
                .post(url.clone())
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(encode_form(params)),
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::timeout(url.as_str())
            } else {
                TransportError::network(url.as_str(), e)
            }
        })?;

        let final_url = response.url().clone();
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::http_status(final_url.as_str(), status.as_u16()));
        }

        let body = response.text().await.map_err(|source| TransportError::Body {
            url: final_url.to_string(),
            source,
        })?;
        debug!(final_url = %final_url, body_len = body.len(), "response received");

        Ok(RawResponse { final_url, body })
    }
}

fn encode_form(params: &Params) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish()
}

fn build_client(cookies: Arc<Jar>, options: TransportOptions) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(options.connect_timeout)
        .timeout(options.read_timeout)
        .gzip(true)
        .redirect(redirect::Policy::limited(MAX_REDIRECTS))
        .user_agent(user_agent::default_user_agent())
        .cookie_provider(cookies)
        .build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, ResponseTemplate};

    use super::*;
    use crate::test_support::socket_guard::start_mock_server_or_skip;

    fn transport() -> HttpTransport {
        HttpTransport::new(TransportOptions::default()).unwrap()
    }

    #[test]
    fn test_encode_form_escapes_values() {
        let params: Params = [("segaId", "a b"), ("password", "p&w=")].into_iter().collect();
        assert_eq!(encode_form(&params), "segaId=a+b&password=p%26w%3D");
    }

    #[tokio::test]
    async fn test_get_sends_query_and_reports_final_url() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/start"))
            .and(query_param("genre", "101"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("location", "/landed?x=1"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/landed"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>ok</p>"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/start", server.uri())).unwrap();
        let params: Params = [("genre", "101")].into_iter().collect();
        let response = transport().execute(Method::Get, &url, &params).await.unwrap();

        assert_eq!(response.final_url.path(), "/landed");
        assert_eq!(response.body, "<p>ok</p>");
    }

    #[tokio::test]
    async fn test_post_sends_form_body() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("POST"))
            .and(path("/submit"))
            .and(header("content-type", FORM_CONTENT_TYPE))
            .and(body_string("segaId=user&password=secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string("welcome"))
            .expect(1)
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/submit", server.uri())).unwrap();
        let params: Params = [("segaId", "user"), ("password", "secret")].into_iter().collect();
        let response = transport().execute(Method::Post, &url, &params).await.unwrap();
        assert_eq!(response.body, "welcome");
    }

    #[tokio::test]
    async fn test_cookies_persist_across_calls() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/set"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("set-cookie", "userId=abc; Path=/"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/check"))
            .and(header("cookie", "userId=abc"))
            .respond_with(ResponseTemplate::new(200).set_body_string("cookie seen"))
            .mount(&server)
            .await;

        let transport = transport();
        let base = Url::parse(&server.uri()).unwrap();
        transport
            .execute(Method::Get, &base.join("/set").unwrap(), &Params::new())
            .await
            .unwrap();
        let response = transport
            .execute(Method::Get, &base.join("/check").unwrap(), &Params::new())
            .await
            .unwrap();
        assert_eq!(response.body, "cookie seen");
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let err = transport()
            .execute(Method::Get, &url, &Params::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::HttpStatus { status: 503, .. }));
    }
}
