use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of every failure a submission can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UserInput,
    Translation,
    Protocol,
    Transport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceName {
    Composition,
    Playback,
    Catalog,
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Composition => "composition service",
            Self::Playback => "playback service",
            Self::Catalog => "catalog source",
        };
        f.write_str(name)
    }
}

/// A well-formed refusal from one of the collaborating services.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{service} failed: {detail}")]
pub struct ServiceFault {
    pub service: ServiceName,
    pub status: Option<u16>,
    pub detail: String,
}

impl ServiceFault {
    pub fn new(service: ServiceName, status: Option<u16>, detail: impl Into<String>) -> Self {
        Self {
            service,
            status,
            detail: detail.into(),
        }
    }
}
