//! Scent catalog: scent name → device metadata, loaded once and read-only afterwards.

use std::{
    collections::{BTreeMap, HashMap},
    path::PathBuf,
};

use reqwest::Client;
use shared::domain::CatalogEntry;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    File(PathBuf),
    Url(String),
}

impl CatalogSource {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Url(raw.to_string())
        } else {
            Self::File(PathBuf::from(raw))
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Url(url) => url.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to fetch catalog: {0}")]
    Http(#[from] reqwest::Error),
    #[error("catalog source answered with status {0}")]
    Status(u16),
    #[error("catalog is not a scent-name mapping: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("catalog has no entries")]
    Empty,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogLoadError> {
        let entries: BTreeMap<String, CatalogEntry> = serde_json::from_str(raw)?;
        if entries.is_empty() {
            return Err(CatalogLoadError::Empty);
        }
        Ok(Self { entries })
    }

    /// Loads the catalog from `source`.
    ///
    /// Never fails: any problem is logged and yields an empty catalog, which
    /// makes every later lookup report the scent as absent.
    pub async fn load(source: &CatalogSource, http: &Client) -> Self {
        match Self::try_load(source, http).await {
            Ok(catalog) => {
                info!(
                    source = %source.describe(),
                    scents = catalog.len(),
                    "scent catalog loaded"
                );
                catalog
            }
            Err(error) => {
                warn!(
                    source = %source.describe(),
                    %error,
                    "scent catalog unavailable; playback translation will be refused"
                );
                Self::empty()
            }
        }
    }

    pub async fn try_load(
        source: &CatalogSource,
        http: &Client,
    ) -> Result<Self, CatalogLoadError> {
        let raw = match source {
            CatalogSource::File(path) => tokio::fs::read_to_string(path).await?,
            CatalogSource::Url(url) => {
                let res = http.get(url).send().await?;
                if !res.status().is_success() {
                    return Err(CatalogLoadError::Status(res.status().as_u16()));
                }
                res.text().await?
            }
        };
        Self::from_json_str(&raw)
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Device locations claimed by more than one scent, with the scents sharing them.
    pub fn duplicate_locations(&self) -> Vec<(String, Vec<String>)> {
        let mut by_location: HashMap<&str, Vec<String>> = HashMap::new();
        for (name, entry) in &self.entries {
            if let Some(location) = entry.device_location() {
                by_location.entry(location).or_default().push(name.clone());
            }
        }

        let mut duplicates: Vec<(String, Vec<String>)> = by_location
            .into_iter()
            .filter(|(_, names)| names.len() > 1)
            .map(|(location, names)| (location.to_string(), names))
            .collect();
        duplicates.sort();
        duplicates
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE: &str = r#"{
        "Petrichor": {"location": "3", "family": "earthy"},
        "Sea Salt": {"location": 7},
        "Smoke": {"family": "dark"}
    }"#;

    #[test]
    fn parses_mapping_and_preserves_metadata() {
        let catalog = Catalog::from_json_str(SAMPLE).expect("catalog");
        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.get("Petrichor").and_then(|e| e.device_location()),
            Some("3")
        );
        assert_eq!(
            catalog.get("Sea Salt").and_then(|e| e.device_location()),
            Some("7")
        );
        assert!(catalog.get("Smoke").is_some());
        assert!(catalog.get("Smoke").and_then(|e| e.device_location()).is_none());
        assert!(catalog.get("Lavender").is_none());
    }

    #[test]
    fn rejects_empty_and_non_object_documents() {
        assert!(matches!(
            Catalog::from_json_str("{}"),
            Err(CatalogLoadError::Empty)
        ));
        assert!(matches!(
            Catalog::from_json_str("[1, 2]"),
            Err(CatalogLoadError::Malformed(_))
        ));
    }

    #[test]
    fn source_parsing_distinguishes_urls_from_paths() {
        assert_eq!(
            CatalogSource::parse("https://cdn.example/scents.json"),
            CatalogSource::Url("https://cdn.example/scents.json".into())
        );
        assert_eq!(
            CatalogSource::parse(" ./scent_classification.json "),
            CatalogSource::File(PathBuf::from("./scent_classification.json"))
        );
    }

    #[test]
    fn reports_shared_locations() {
        let catalog = Catalog::from_json_str(
            r#"{
                "Amber": {"location": "2"},
                "Musk": {"location": 2},
                "Rose": {"location": "5"}
            }"#,
        )
        .expect("catalog");
        assert_eq!(
            catalog.duplicate_locations(),
            vec![("2".to_string(), vec!["Amber".to_string(), "Musk".to_string()])]
        );
    }

    #[tokio::test]
    async fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(SAMPLE.as_bytes()).expect("write");

        let catalog = Catalog::load(
            &CatalogSource::File(file.path().to_path_buf()),
            &Client::new(),
        )
        .await;
        assert_eq!(catalog.len(), 3);
    }

    #[tokio::test]
    async fn missing_or_malformed_file_loads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = Catalog::load(
            &CatalogSource::File(dir.path().join("absent.json")),
            &Client::new(),
        )
        .await;
        assert!(missing.is_empty());

        let broken_path = dir.path().join("broken.json");
        std::fs::write(&broken_path, "{ not json").expect("write");
        let broken = Catalog::load(&CatalogSource::File(broken_path), &Client::new()).await;
        assert!(broken.is_empty());
    }

    #[tokio::test]
    async fn loads_from_url_and_degrades_on_http_error() {
        use axum::{http::StatusCode, routing::get, Router};

        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        let app = Router::new()
            .route("/scent_classification.json", get(|| async { SAMPLE }))
            .route(
                "/gone.json",
                get(|| async { (StatusCode::NOT_FOUND, "missing") }),
            );
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let http = Client::new();
        let catalog = Catalog::load(
            &CatalogSource::parse(&format!("http://{addr}/scent_classification.json")),
            &http,
        )
        .await;
        assert_eq!(catalog.len(), 3);

        let source = CatalogSource::parse(&format!("http://{addr}/gone.json"));
        assert!(matches!(
            Catalog::try_load(&source, &http).await,
            Err(CatalogLoadError::Status(404))
        ));
        assert!(Catalog::load(&source, &http).await.is_empty());
    }
}
