//! Dispatch pipeline.
//!
//! Every request of a connection goes through the same chain, composed once
//! at construction time (outermost first):
//!
//! ```text
//! MaintenanceGuard -> Retrying -> BaseDispatch -> Transport
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::error::ClientError;
use super::maintenance::{Clock, MaintenanceGuard};
use super::request::{RawResponse, RequestSpec};
use super::retry::{RetryBudget, RetryPolicy, Retrying, classify_error};
use super::transport::Transport;

/// One step of the dispatch chain.
#[async_trait]
pub trait Dispatch: Send + Sync {
    /// Sends `request`, spending retries from `budget`.
    async fn dispatch(
        &self,
        request: &RequestSpec,
        budget: &mut RetryBudget,
    ) -> Result<RawResponse, ClientError>;
}

/// Innermost step: one transport call, with transient failures marked for
/// the retry layer.
#[derive(Debug)]
pub struct BaseDispatch<T> {
    transport: T,
}

impl<T> BaseDispatch<T> {
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[async_trait]
impl<T: Transport> Dispatch for BaseDispatch<T> {
    #[instrument(level = "debug", skip_all, fields(request = %request))]
    async fn dispatch(
        &self,
        request: &RequestSpec,
        _budget: &mut RetryBudget,
    ) -> Result<RawResponse, ClientError> {
        self.transport
            .execute(request.method, &request.target, &request.params)
            .await
            .map_err(|error| {
                let failure = classify_error(&error);
                debug!(?failure, %error, "transport failed");
                if failure.is_retryable() {
                    ClientError::RequestRetry(error)
                } else {
                    ClientError::Transport(error)
                }
            })
    }
}

/// The full chain over a transport.
pub type Pipeline<T> = MaintenanceGuard<Retrying<BaseDispatch<T>>>;

/// Composes the chain in its fixed order.
#[must_use]
pub fn build_pipeline<T: Transport>(
    transport: T,
    policy: RetryPolicy,
    clock: Arc<dyn Clock>,
) -> Pipeline<T> {
    MaintenanceGuard::new(Retrying::new(BaseDispatch::new(transport), policy), clock)
}
