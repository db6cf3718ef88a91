//! Error types for the text-generation client and flows.

use thiserror::Error;

/// Text-generation failures.
///
/// Callers in the notification path treat all of these as "mark the sale
/// failed and move on"; the catalog path surfaces them to the user.
#[derive(Debug, Error)]
pub enum AiError {
    /// The HTTP request could not be sent or completed.
    #[error("Generation request failed: {0}")]
    RequestFailed(String),

    /// The endpoint answered with a non-success status.
    #[error("Generation API returned {status}: {body}")]
    ApiStatus { status: u16, body: String },

    /// The endpoint answered 2xx but the payload was not usable.
    #[error("Invalid generation response: {0}")]
    InvalidResponse(String),

    /// The model returned no choices / empty content.
    #[error("Generation produced no output")]
    EmptyOutput,
}

/// Result type for generation operations.
pub type AiResult<T> = Result<T, AiError>;
