//! HTTP plumbing shared by the composition and playback clients.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use shared::{
    error::ServiceName,
    protocol::{HealthResponse, StatusResponse},
};
use tracing::debug;

use crate::{error::ClientError, Outcome};

/// A service base URL together with the policy used to talk to it.
#[derive(Debug, Clone)]
pub(crate) struct Endpoint {
    pub service: ServiceName,
    pub base_url: String,
    pub timeout: Duration,
}

impl Endpoint {
    pub fn new(service: ServiceName, base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into();
        Self {
            service,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Sends `request` and returns the status with the raw body text.
    ///
    /// Only failures below HTTP become errors here; interpreting the status is
    /// left to the caller.
    pub async fn send(&self, request: RequestBuilder) -> Result<(StatusCode, String), ClientError> {
        let res = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| self.transport_error(source))?;
        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| self.transport_error(source))?;
        debug!(service = %self.service, status = status.as_u16(), "service responded");
        Ok((status, body))
    }

    pub async fn health(&self, http: &Client) -> Result<Outcome, ClientError> {
        let (status, body) = self.send(http.get(self.url("/health"))).await?;
        let parsed: HealthResponse = serde_json::from_str(&body)
            .map_err(|_| self.shape_mismatch(status, &body))?;
        let message = parsed
            .message
            .clone()
            .unwrap_or_else(|| format!("{} is running", self.service));
        if status.is_success() && parsed.is_healthy() {
            Ok(Outcome::Ok(message))
        } else {
            Ok(Outcome::Failed(message))
        }
    }

    /// Reads a `{status, message}` envelope, whatever the HTTP status.
    pub fn status_outcome(&self, status: StatusCode, body: &str) -> Result<Outcome, ClientError> {
        let parsed: StatusResponse =
            serde_json::from_str(body).map_err(|_| self.shape_mismatch(status, body))?;
        if parsed.is_success() {
            Ok(Outcome::Ok(parsed.message))
        } else {
            Ok(Outcome::Failed(parsed.message))
        }
    }

    pub fn shape_mismatch(&self, status: StatusCode, body: &str) -> ClientError {
        let detail = if body.trim().is_empty() {
            format!("empty response (HTTP {})", status.as_u16())
        } else {
            body.to_string()
        };
        ClientError::protocol(self.service, Some(status.as_u16()), detail)
    }

    fn transport_error(&self, source: reqwest::Error) -> ClientError {
        ClientError::transport(self.service, &self.base_url, self.timeout, source)
    }
}
