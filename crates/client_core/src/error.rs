use std::{fmt, time::Duration};

use shared::error::{ErrorKind, ServiceFault, ServiceName};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationFault {
    UnknownScent,
    MissingLocation,
    InvalidLocation,
}

impl fmt::Display for TranslationFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UnknownScent => "scent not in catalog",
            Self::MissingLocation => "location not found",
            Self::InvalidLocation => "location is not a device slot number",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    UserInput(String),
    #[error("{fault} for scent: {scent_name}")]
    Translation {
        scent_name: String,
        fault: TranslationFault,
    },
    #[error(transparent)]
    Protocol(#[from] ServiceFault),
    #[error("{hint}")]
    Transport {
        service: ServiceName,
        hint: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ClientError {
    pub fn user_input(message: impl Into<String>) -> Self {
        Self::UserInput(message.into())
    }

    pub fn protocol(service: ServiceName, status: Option<u16>, detail: impl Into<String>) -> Self {
        Self::Protocol(ServiceFault::new(service, status, detail))
    }

    /// Wraps a failure below HTTP (refused, reset, DNS, timeout) with guidance
    /// the user can act on.
    pub fn transport(
        service: ServiceName,
        base_url: &str,
        timeout: Duration,
        source: reqwest::Error,
    ) -> Self {
        let hint = transport_hint(service, base_url, timeout, &source);
        Self::Transport {
            service,
            hint,
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UserInput(_) => ErrorKind::UserInput,
            Self::Translation { .. } => ErrorKind::Translation,
            Self::Protocol(_) => ErrorKind::Protocol,
            Self::Transport { .. } => ErrorKind::Transport,
        }
    }

    /// Text shown to the user; protocol failures surface the service detail verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Self::Protocol(fault) => fault.detail.clone(),
            other => other.to_string(),
        }
    }
}

fn transport_hint(
    service: ServiceName,
    base_url: &str,
    timeout: Duration,
    source: &reqwest::Error,
) -> String {
    if source.is_timeout() {
        return format!(
            "The {service} at {base_url} did not answer within {timeout:?}. \
             It may be busy or stuck; retry, or restart it."
        );
    }

    match service {
        ServiceName::Composition => format!(
            "Network error calling the composition service. Is it running on {base_url}?"
        ),
        ServiceName::Playback => format!(
            "Could not reach the playback service. Make sure:\n\
             1. The playback service is running on {base_url}\n\
             2. Your device is powered on and paired\n\
             3. The device is in range"
        ),
        ServiceName::Catalog => format!("Could not fetch the scent catalog from {base_url}."),
    }
}
