use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::DeviceCommand,
    error::ServiceName,
    protocol::{PlayScentRequest, PlaySequenceRequest},
};
use tracing::{info, warn};

use crate::{error::ClientError, transport::Endpoint, Outcome, PlaybackService};

pub struct PlaybackClient {
    http: Client,
    endpoint: Endpoint,
    probe_timeout: Duration,
}

impl PlaybackClient {
    /// `timeout` bounds playback requests, which only return once the device
    /// has finished; `probe_timeout` bounds the connectivity and health checks.
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        timeout: Duration,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            http,
            endpoint: Endpoint::new(ServiceName::Playback, base_url, timeout),
            probe_timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.endpoint.base_url
    }

    pub async fn play(&self, commands: &[DeviceCommand]) -> Result<Outcome, ClientError> {
        let request = self
            .http
            .post(self.endpoint.url("/play_sequence"))
            .json(&PlaySequenceRequest {
                sequence: commands.to_vec(),
            });
        let (status, body) = self.endpoint.send(request).await?;
        let outcome = self.endpoint.status_outcome(status, &body)?;
        log_outcome("play_sequence", &outcome);
        Ok(outcome)
    }

    pub async fn play_scent(&self, command: DeviceCommand) -> Result<Outcome, ClientError> {
        let request = self
            .http
            .post(self.endpoint.url("/play_scent"))
            .json(&PlayScentRequest { command });
        let (status, body) = self.endpoint.send(request).await?;
        let outcome = self.endpoint.status_outcome(status, &body)?;
        log_outcome("play_scent", &outcome);
        Ok(outcome)
    }

    pub async fn probe(&self) -> Result<Outcome, ClientError> {
        let probe = self.probe_endpoint();
        let (status, body) = probe
            .send(self.http.get(probe.url("/test_connection")))
            .await?;
        let outcome = probe.status_outcome(status, &body)?;
        log_outcome("test_connection", &outcome);
        Ok(outcome)
    }

    pub async fn health(&self) -> Result<Outcome, ClientError> {
        self.probe_endpoint().health(&self.http).await
    }

    fn probe_endpoint(&self) -> Endpoint {
        Endpoint {
            timeout: self.probe_timeout,
            ..self.endpoint.clone()
        }
    }
}

fn log_outcome(call: &'static str, outcome: &Outcome) {
    match outcome {
        Outcome::Ok(_) => info!(call, "playback service reported success"),
        Outcome::Failed(message) => warn!(call, %message, "playback service reported failure"),
    }
}

#[async_trait]
impl PlaybackService for PlaybackClient {
    async fn play(&self, commands: &[DeviceCommand]) -> Result<Outcome, ClientError> {
        PlaybackClient::play(self, commands).await
    }

    async fn play_scent(&self, command: DeviceCommand) -> Result<Outcome, ClientError> {
        PlaybackClient::play_scent(self, command).await
    }

    async fn probe(&self) -> Result<Outcome, ClientError> {
        PlaybackClient::probe(self).await
    }

    async fn health(&self) -> Result<Outcome, ClientError> {
        PlaybackClient::health(self).await
    }
}
