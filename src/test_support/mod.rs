//! Test doubles shared by the unit tests.

#![allow(clippy::unwrap_used)]

pub mod fixtures;
pub mod socket_guard;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use url::Url;

use crate::client::{Method, Params, RawResponse, Transport, TransportError};

/// One call seen by a [`ScriptedTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: Method,
    pub url: Url,
    pub params: Params,
}

#[derive(Debug, Default)]
struct Script {
    responses: VecDeque<Result<RawResponse, TransportError>>,
    calls: Vec<RecordedCall>,
}

/// Transport that replays queued results in order and records every call.
///
/// Clones share the queue and the call log. Running out of responses is a
/// 404 so a test that makes an unexpected call fails loudly.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues a successful response whose final URL is `final_url`.
    pub fn push_body(&self, final_url: &str, body: &str) {
        let final_url = Url::parse(final_url).unwrap();
        self.script().responses.push_back(Ok(RawResponse {
            final_url,
            body: body.to_string(),
        }));
    }

    pub fn push_error(&self, error: TransportError) {
        self.script().responses.push_back(Err(error));
    }

    pub fn call_count(&self) -> usize {
        self.script().calls.len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.script().calls.clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(
        &self,
        method: Method,
        url: &Url,
        params: &Params,
    ) -> Result<RawResponse, TransportError> {
        let mut script = self.script();
        script.calls.push(RecordedCall {
            method,
            url: url.clone(),
            params: params.clone(),
        });
        script
            .responses
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::http_status(url.as_str(), 404)))
    }
}
