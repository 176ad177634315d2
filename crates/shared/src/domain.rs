use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);
    };
}

id_newtype!(ScentId);

/// One step of a composed sequence, in playback order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceItem {
    pub scent_name: String,
    /// Whole seconds.
    pub scent_duration: u32,
}

/// One addressed command understood by the playback service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCommand {
    pub scent_id: ScentId,
    pub duration: u32,
}

/// Catalog metadata for a single scent.
///
/// Only `location` is interpreted; every other field is carried through as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(
        default,
        deserialize_with = "location_from_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub location: Option<String>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl CatalogEntry {
    /// The device location, if present and non-blank.
    pub fn device_location(&self) -> Option<&str> {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|location| !location.is_empty())
    }
}

fn location_from_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => Ok(Some(raw)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "location must be a string or integer, got {other}"
        ))),
    }
}
