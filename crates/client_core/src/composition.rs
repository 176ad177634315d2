use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::SequenceItem,
    error::ServiceName,
    protocol::{ComposeRequest, ComposeResponse},
};
use tracing::{info, warn};

use crate::{error::ClientError, transport::Endpoint, ComposeService, Outcome};

pub const BLANK_STATEMENT_MESSAGE: &str = "Please enter your statement before composing.";

/// What the composition service produced for one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    /// `None` when the service answered without a sequence.
    pub sequence: Option<Vec<SequenceItem>>,
    pub justification: Option<String>,
}

pub struct CompositionClient {
    http: Client,
    endpoint: Endpoint,
}

impl CompositionClient {
    pub fn new(http: Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http,
            endpoint: Endpoint::new(ServiceName::Composition, base_url, timeout),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.endpoint.base_url
    }

    pub async fn compose(&self, statement: &str) -> Result<Composition, ClientError> {
        let sentence = statement.trim();
        if sentence.is_empty() {
            return Err(ClientError::user_input(BLANK_STATEMENT_MESSAGE));
        }

        let request = self
            .http
            .post(self.endpoint.url("/compose"))
            .json(&ComposeRequest {
                sentence: sentence.to_string(),
            });
        let (status, body) = self.endpoint.send(request).await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "composition request rejected");
            return Err(ClientError::protocol(
                ServiceName::Composition,
                Some(status.as_u16()),
                body,
            ));
        }

        let parsed: ComposeResponse = serde_json::from_str(&body)
            .map_err(|_| self.endpoint.shape_mismatch(status, &body))?;

        if let Some(item) = parsed
            .scent_sequence
            .iter()
            .flatten()
            .find(|item| item.scent_duration == 0)
        {
            return Err(ClientError::protocol(
                ServiceName::Composition,
                Some(status.as_u16()),
                format!("scent '{}' has a non-positive duration", item.scent_name),
            ));
        }

        info!(
            items = parsed.scent_sequence.as_ref().map_or(0, Vec::len),
            "composition received"
        );
        Ok(Composition {
            sequence: parsed.scent_sequence,
            justification: parsed.justification,
        })
    }

    pub async fn health(&self) -> Result<Outcome, ClientError> {
        self.endpoint.health(&self.http).await
    }
}

#[async_trait]
impl ComposeService for CompositionClient {
    async fn compose(&self, statement: &str) -> Result<Composition, ClientError> {
        CompositionClient::compose(self, statement).await
    }

    async fn health(&self) -> Result<Outcome, ClientError> {
        CompositionClient::health(self).await
    }
}
