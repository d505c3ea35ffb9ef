use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct B64Bytes {
    pub b64: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Example {
    pub image: B64Bytes,
}

/// Body posted to the inference backend. Always carries exactly one example.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InferenceRequest {
    pub examples: Vec<Example>,
}

/// Reply as decoded off the wire, before any validation of the pairs.
#[derive(Debug, Deserialize, Clone)]
pub struct InferenceResponse {
    #[serde(default)]
    pub results: Vec<Vec<[Value; 2]>>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub error: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredLabel {
    pub label: String,
    pub score: f64,
}

impl ScoredLabel {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Top-N labels, highest score first.
pub type RankedResult = Vec<ScoredLabel>;

/// An uploaded file as captured from the multipart form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}
