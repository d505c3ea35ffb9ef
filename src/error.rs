use thiserror::Error;

use crate::parse::ParseError;

/// Why a request produced no ranking. Every variant is terminal for the
/// request that hit it; none are retried.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("classification unavailable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("unexpected backend reply: {0}")]
    Parse(#[from] ParseError),
}

impl PipelineError {
    /// Short label for the stage the request died in.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Transport(_) => "TransportFailed",
            PipelineError::Backend(_) => "BackendError",
            PipelineError::Parse(_) => "ParseFailed",
        }
    }
}
