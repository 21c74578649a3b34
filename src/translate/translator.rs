//! Core `Translator` trait and its error type.

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// TranslationError
// ---------------------------------------------------------------------------

/// Errors that can occur while translating one message.
///
/// All variants are recoverable: the pipeline records them against the
/// message and moves on to the next one.
#[derive(Debug, Clone, Error)]
pub enum TranslationError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("translation request timed out")]
    Timeout,

    /// The service answered with a non-success status.
    #[error("translation service returned HTTP {0}")]
    Status(u16),

    /// The response body did not have the expected shape.
    #[error("failed to parse translation response: {0}")]
    Parse(String),

    /// The service returned no usable text.
    #[error("translation service returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for TranslationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TranslationError::Timeout
        } else if let Some(status) = e.status() {
            TranslationError::Status(status.as_u16())
        } else {
            TranslationError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Translator trait
// ---------------------------------------------------------------------------

/// Async, per-message translation.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn Translator>`.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target_language` (ISO-639-1).
    async fn translate(&self, text: &str, target_language: &str)
        -> Result<String, TranslationError>;

    /// Whether the backend can accept work.
    fn is_ready(&self) -> bool {
        true
    }
}
