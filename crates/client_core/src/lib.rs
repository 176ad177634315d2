use std::fmt;

use async_trait::async_trait;
use shared::domain::DeviceCommand;

pub mod catalog;
pub mod composition;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod playback;
pub mod profile;
pub mod severity;
mod transport;
pub mod translate;

pub use catalog::{Catalog, CatalogSource};
pub use composition::{Composition, CompositionClient};
pub use config::{load_settings, ClientSettings};
pub use error::{ClientError, TranslationFault};
pub use lifecycle::{
    ActionKind, ComposeReport, HealthReport, LifecycleEvent, Orchestrator, RequestState,
    Submission,
};
pub use playback::PlaybackClient;
pub use profile::{ProfileNote, ScentProfile};

/// Application-level answer from a service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ok(String),
    Failed(String),
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Ok(message) | Self::Failed(message) => message,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[async_trait]
pub trait ComposeService: Send + Sync {
    async fn compose(&self, statement: &str) -> Result<Composition, ClientError>;
    async fn health(&self) -> Result<Outcome, ClientError>;
}

#[async_trait]
pub trait PlaybackService: Send + Sync {
    async fn play(&self, commands: &[DeviceCommand]) -> Result<Outcome, ClientError>;
    async fn play_scent(&self, command: DeviceCommand) -> Result<Outcome, ClientError>;
    async fn probe(&self) -> Result<Outcome, ClientError>;
    async fn health(&self) -> Result<Outcome, ClientError>;
}

#[cfg(test)]
#[path = "tests/composition_tests.rs"]
mod composition_tests;

#[cfg(test)]
#[path = "tests/playback_tests.rs"]
mod playback_tests;
