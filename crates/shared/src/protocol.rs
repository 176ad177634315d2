use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{DeviceCommand, SequenceItem};

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_HEALTHY: &str = "ok";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeRequest {
    pub sentence: String,
}

/// Body of a 2xx `POST /compose`.
///
/// `scent_sequence` is optional on the wire: a response without it means no
/// sequence was produced, which is not a protocol violation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComposeResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scent_sequence: Option<Vec<SequenceItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaySequenceRequest {
    pub sequence: Vec<DeviceCommand>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayScentRequest {
    #[serde(flatten)]
    pub command: DeviceCommand,
}

/// Envelope returned by `/play_sequence`, `/play_scent` and `/test_connection`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
    /// Diagnostic extras such as `address`, `device_name` or `keyword`.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl StatusResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == STATUS_HEALTHY
    }
}
