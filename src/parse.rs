//! Validation of the backend's `:classify` reply.
//!
//! The wire format is loosely typed (`[[[label, score], ...]]`), so every pair
//! is checked explicitly before it becomes a [`ScoredLabel`].

use log::warn;
use serde_json::Value;
use thiserror::Error;

use crate::models::{InferenceResponse, ScoredLabel};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("could not decode backend reply: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("got {0} result sets, expected 1")]
    Shape(usize),

    #[error("pair {index} has types {label_type}/{score_type}, want string/number: {pair}")]
    TypeMismatch {
        index: usize,
        label_type: &'static str,
        score_type: &'static str,
        pair: String,
    },
}

pub fn decode_response(body: &[u8]) -> Result<InferenceResponse, ParseError> {
    Ok(serde_json::from_slice(body)?)
}

/// Pull the scored labels out of the single result set, keeping backend order.
pub fn scores_from(resp: &InferenceResponse) -> Result<Vec<ScoredLabel>, ParseError> {
    if resp.results.len() != 1 {
        return Err(ParseError::Shape(resp.results.len()));
    }

    let pairs = &resp.results[0];
    let mut scores = Vec::with_capacity(pairs.len());

    for (index, pair) in pairs.iter().enumerate() {
        let (label, score) = match (&pair[0], pair[1].as_f64()) {
            (Value::String(label), Some(score)) => (label, score),
            _ => {
                return Err(ParseError::TypeMismatch {
                    index,
                    label_type: json_type(&pair[0]),
                    score_type: json_type(&pair[1]),
                    pair: Value::Array(pair.to_vec()).to_string(),
                })
            }
        };

        if label.is_empty() {
            warn!("empty label at position {} in backend reply: {:?}", index, pair);
        }
        scores.push(ScoredLabel::new(label.clone(), score));
    }

    Ok(scores)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
