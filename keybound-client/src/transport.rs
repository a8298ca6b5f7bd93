//! Validation transport abstraction.
//!
//! The validator talks to the license service through this trait so the
//! resolution protocol can run against any backend: the real HTTP client
//! (behind the `online` feature), or the scriptable mock below in tests.

use async_trait::async_trait;
use keybound_license::ValidationResponse;
use keybound_types::LicenseKey;
use serde::Serialize;
use thiserror::Error;

/// Transport-level failures.
///
/// The distinction matters: only `Network` triggers grace fallback.
/// `Remote` is an authoritative answer from the service and is either
/// mapped to a negative license status or surfaced as-is.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Connectivity or timeout failure; no response was obtained.
    #[error("network error: {0}")]
    Network(String),

    /// The service responded with an error status.
    #[error("remote error (HTTP {status}): {message}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Response body or status text.
        message: String,
    },
}

/// Context sent along with a validation call.
///
/// A closed set of named optional fields; absent fields are omitted from
/// the request body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationRequest {
    /// Hardware identifier for device-bound licenses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware_id: Option<String>,
    /// Operating system name, for service-side telemetry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_name: Option<String>,
    /// Product identifier when one account spans several products.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
}

/// A transport that can validate a license key against the service.
#[async_trait]
pub trait ValidationTransport: Send + Sync {
    /// Performs one validation round-trip.
    async fn validate(
        &self,
        key: &LicenseKey,
        request: &ValidationRequest,
    ) -> Result<ValidationResponse, TransportError>;
}

/// A scriptable transport for testing.
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays a queue of scripted outcomes and counts calls.
    #[derive(Debug, Default)]
    pub struct MockTransport {
        outcomes: Mutex<VecDeque<Result<ValidationResponse, TransportError>>>,
        calls: AtomicUsize,
        delay: Mutex<Option<std::time::Duration>>,
    }

    impl MockTransport {
        /// Creates an empty mock; an exhausted queue answers with a
        /// network error.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Queues a successful response.
        pub fn push_ok(&self, response: ValidationResponse) {
            self.outcomes.lock().unwrap().push_back(Ok(response));
        }

        /// Queues a failure.
        pub fn push_err(&self, error: TransportError) {
            self.outcomes.lock().unwrap().push_back(Err(error));
        }

        /// Delays every call, for overlap tests.
        pub fn set_delay(&self, delay: std::time::Duration) {
            *self.delay.lock().unwrap() = Some(delay);
        }

        /// Number of validation calls made so far.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ValidationTransport for MockTransport {
        async fn validate(
            &self,
            _key: &LicenseKey,
            _request: &ValidationRequest,
        ) -> Result<ValidationResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = *self.delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Err(TransportError::Network("mock transport exhausted".to_string()))
                })
        }
    }
}
