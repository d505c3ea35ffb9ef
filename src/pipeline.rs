//! Per-request classification pipeline.
//!
//! `Received -> Encoded -> Sent -> AwaitingReply -> Parsed -> Ranked`, with
//! any failure ending the request. There is exactly one backend call per
//! run and nothing is retried.

use std::fmt;

use log::{debug, error, warn};
use uuid::Uuid;

use crate::backend::{BackendClient, BackendReply};
use crate::encoding::encode_image;
use crate::error::PipelineError;
use crate::models::{RankedResult, ScoredLabel};
use crate::parse::{decode_response, scores_from};
use crate::rank::top_n;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Received,
    Encoded,
    Sent,
    AwaitingReply,
    Parsed,
    Ranked,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What a run produced. The encoded image is kept even on failure so the
/// upload can still be shown back to the user.
#[derive(Debug)]
pub struct Classification {
    pub image_b64: String,
    pub outcome: Result<RankedResult, PipelineError>,
}

pub async fn run(
    client: &BackendClient,
    image: &[u8],
    num_results: usize,
    request_id: Uuid,
) -> Classification {
    let trace = |stage: Stage| debug!("[{}] {}", request_id, stage);

    trace(Stage::Received);
    let body = encode_image(image);
    let image_b64 = body.examples[0].image.b64.clone();
    trace(Stage::Encoded);

    trace(Stage::Sent);
    let reply = client.classify(&body).await;
    trace(Stage::AwaitingReply);

    let outcome = match reply {
        Ok(reply) => interpret_reply(&reply).map(|scores| {
            trace(Stage::Parsed);
            let ranked = top_n(&scores, num_results);
            trace(Stage::Ranked);
            ranked
        }),
        Err(e) => Err(PipelineError::from(e)),
    };

    if let Err(e) = &outcome {
        match e {
            PipelineError::Transport(_) => {
                error!("[{}] {} calling {}: {}", request_id, e.kind(), client.address(), e)
            }
            _ => warn!("[{}] {}: {}", request_id, e.kind(), e),
        }
    }

    Classification { image_b64, outcome }
}

/// Turn a raw reply into scored labels, in backend order.
///
/// A reported backend error wins over shape problems: an empty `results`
/// alongside a non-empty `error` is a backend failure, not a parse failure.
pub fn interpret_reply(reply: &BackendReply) -> Result<Vec<ScoredLabel>, PipelineError> {
    if !reply.status.is_success() {
        let message = decode_response(&reply.body)
            .ok()
            .map(|resp| resp.error)
            .filter(|error| !error.is_empty())
            .unwrap_or_else(|| format!("HTTP {}", reply.status));
        return Err(PipelineError::Backend(message));
    }

    let resp = decode_response(&reply.body)?;
    if !resp.error.is_empty() {
        return Err(PipelineError::Backend(resp.error));
    }

    Ok(scores_from(&resp)?)
}
