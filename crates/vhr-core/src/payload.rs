//! # Raw Report Payload
//!
//! The backend document attached to a successful job. Every field is
//! optional or defaulted: the content is AI-generated and the transformer,
//! not deserialization, decides what is fatal.

use serde::{Deserialize, Deserializer, Serialize};

/// Untyped report document as emitted by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawReportPayload {
    #[serde(default)]
    pub vin: Option<String>,
    /// Section documents keyed by section name. May arrive as an object,
    /// as a JSON-encoded string, or not at all.
    #[serde(default)]
    pub report_data: serde_json::Value,
    /// ISO-8601 generation timestamp.
    #[serde(default)]
    pub generated_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub providers_used: Vec<String>,
    /// Confidence on a 0–1 or 0–10 scale.
    #[serde(default)]
    pub confidence_score: Option<f64>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
