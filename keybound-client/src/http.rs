//! HTTP validation transport (`online` feature).
//!
//! A thin reqwest client for the service's validation endpoint. Retry and
//! backoff policy deliberately do not live here: the resolution state
//! machine sees exactly one attempt per revalidation, and connectivity
//! failures are classified for the grace path.

use crate::error::{ClientError, ClientResult};
use crate::transport::{TransportError, ValidationRequest, ValidationTransport};
use async_trait::async_trait;
use keybound_license::ValidationResponse;
use keybound_types::LicenseKey;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// HTTP transport configuration.
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Service base URL.
    pub base_url: String,
    /// Bearer token for the authenticated channel.
    pub api_token: Option<String>,
    /// Whole-request timeout at the HTTP layer. The validator applies its
    /// own (usually tighter) timeout on top.
    pub timeout: Duration,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.keybound.io".to_string(),
            api_token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// The production validation transport.
pub struct HttpTransport {
    config: HttpTransportConfig,
    client: Client,
}

#[derive(Serialize)]
struct ValidateBody<'a> {
    license_key: &'a str,
    #[serde(flatten)]
    request: &'a ValidationRequest,
}

impl HttpTransport {
    /// Builds a transport over a fresh HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if the client cannot be
    /// constructed (TLS backend initialization).
    pub fn new(config: HttpTransportConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Configuration(format!("HTTP client init failed: {e}")))?;
        Ok(Self { config, client })
    }

    fn validate_url(&self) -> String {
        format!(
            "{}/v1/licenses/validate",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ValidationTransport for HttpTransport {
    async fn validate(
        &self,
        key: &LicenseKey,
        request: &ValidationRequest,
    ) -> Result<ValidationResponse, TransportError> {
        let url = self.validate_url();
        debug!(%url, key = %key, "validating license");

        let body = ValidateBody {
            license_key: key.as_str(),
            request,
        };
        let mut http_request = self.client.post(&url).json(&body);
        if let Some(token) = &self.config.api_token {
            http_request = http_request.bearer_auth(token);
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            // A success status with an unreadable body is a server-side
            // protocol violation, not a connectivity failure.
            response
                .json::<ValidationResponse>()
                .await
                .map_err(|e| TransportError::Remote {
                    status: status.as_u16(),
                    message: format!("unreadable validation response: {e}"),
                })
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(TransportError::Remote {
                status: status.as_u16(),
                message,
            })
        }
    }
}
