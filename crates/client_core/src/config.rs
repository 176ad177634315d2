use std::{collections::HashMap, fs, path::Path, time::Duration};

use thiserror::Error;
use url::Url;

use crate::catalog::CatalogSource;

pub const SETTINGS_FILE: &str = "client.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub composition_url: String,
    pub playback_url: String,
    pub catalog_source: String,
    pub compose_timeout_secs: u64,
    pub playback_timeout_secs: u64,
    pub probe_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            composition_url: "http://localhost:8000".into(),
            playback_url: "http://localhost:5000".into(),
            catalog_source: "scent_classification.json".into(),
            compose_timeout_secs: 60,
            // The playback service answers once the whole sequence has played.
            playback_timeout_secs: 180,
            probe_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid {field} '{value}': {source}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{field} must use http or https, got '{value}'")]
    UnsupportedScheme { field: &'static str, value: String },
}

impl ClientSettings {
    pub fn compose_timeout(&self) -> Duration {
        Duration::from_secs(self.compose_timeout_secs)
    }

    pub fn playback_timeout(&self) -> Duration {
        Duration::from_secs(self.playback_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn catalog_source(&self) -> CatalogSource {
        CatalogSource::parse(&self.catalog_source)
    }

    /// Checks both service URLs and strips trailing slashes so endpoint paths
    /// can be appended directly.
    pub fn validated(mut self) -> Result<Self, SettingsError> {
        self.composition_url = normalize_base_url("composition_url", &self.composition_url)?;
        self.playback_url = normalize_base_url("playback_url", &self.playback_url)?;
        Ok(self)
    }
}

/// Defaults, then `client.toml` in the working directory, then the environment.
pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub(crate) fn load_settings_from(
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(file) {
        match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => apply_file_overrides(&mut settings, &file_cfg),
            Err(error) => {
                tracing::warn!(path = %file.display(), %error, "ignoring unreadable settings file")
            }
        }
    }

    if let Some(v) = env("COMPOSITION_URL") {
        settings.composition_url = v;
    }
    if let Some(v) = env("APP__COMPOSITION_URL") {
        settings.composition_url = v;
    }

    if let Some(v) = env("PLAYBACK_URL") {
        settings.playback_url = v;
    }
    if let Some(v) = env("APP__PLAYBACK_URL") {
        settings.playback_url = v;
    }

    if let Some(v) = env("SCENTS_JSON_PATH") {
        settings.catalog_source = v;
    }
    if let Some(v) = env("APP__CATALOG_SOURCE") {
        settings.catalog_source = v;
    }

    if let Some(parsed) = env("APP__COMPOSE_TIMEOUT_SECS").and_then(|v| parse_secs(&v)) {
        settings.compose_timeout_secs = parsed;
    }
    if let Some(parsed) = env("APP__PLAYBACK_TIMEOUT_SECS").and_then(|v| parse_secs(&v)) {
        settings.playback_timeout_secs = parsed;
    }
    if let Some(parsed) = env("APP__PROBE_TIMEOUT_SECS").and_then(|v| parse_secs(&v)) {
        settings.probe_timeout_secs = parsed;
    }

    settings
}

fn apply_file_overrides(settings: &mut ClientSettings, file_cfg: &HashMap<String, String>) {
    if let Some(v) = file_cfg.get("composition_url") {
        settings.composition_url = v.clone();
    }
    if let Some(v) = file_cfg.get("playback_url") {
        settings.playback_url = v.clone();
    }
    if let Some(v) = file_cfg.get("catalog_source") {
        settings.catalog_source = v.clone();
    }
    if let Some(parsed) = file_cfg.get("compose_timeout_secs").and_then(|v| parse_secs(v)) {
        settings.compose_timeout_secs = parsed;
    }
    if let Some(parsed) = file_cfg.get("playback_timeout_secs").and_then(|v| parse_secs(v)) {
        settings.playback_timeout_secs = parsed;
    }
    if let Some(parsed) = file_cfg.get("probe_timeout_secs").and_then(|v| parse_secs(v)) {
        settings.probe_timeout_secs = parsed;
    }
}

fn parse_secs(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|secs| *secs > 0)
}

fn normalize_base_url(field: &'static str, raw: &str) -> Result<String, SettingsError> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed).map_err(|source| SettingsError::InvalidUrl {
        field,
        value: trimmed.to_string(),
        source,
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SettingsError::UnsupportedScheme {
            field,
            value: trimmed.to_string(),
        });
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}
