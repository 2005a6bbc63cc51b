//! Error types for the brain-dump pipeline
//!
//! Malformed model output is never an error here; the parser drops what it
//! cannot recover. These variants cover the pipeline around it.

use neuroverse_llm::LlmError;
use thiserror::Error;

/// Errors that can occur while processing a brain dump
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Completion failed (no provider, upstream rejection, exhaustion)
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// Input exceeds the configured maximum length
    #[error("Text too long: {0} chars (max: {1})")]
    TextTooLong(usize, usize),

    /// Completion did not finish within the configured time
    #[error("Extraction timeout")]
    Timeout,

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::Json(e.to_string())
    }
}
