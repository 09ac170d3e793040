//! Error types for the review pipeline

use thiserror::Error;

/// Errors that can occur in the review pipeline.
///
/// Only the change-set fetch path lets these propagate out of
/// [`crate::Coach::run`]; the analyzer, publisher, and recorder contain
/// their failures internally and report them as explicit outcome values.
#[derive(Error, Debug)]
pub enum CoachError {
    /// Invalid or unusable configuration (e.g. a token that cannot be
    /// turned into an HTTP header)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Hosting-platform request failed (transport, auth, or decode)
    #[error("Platform request failed: {0}")]
    Platform(String),

    /// Text-generation request failed (transport, auth, or decode)
    #[error("Model request failed: {0}")]
    Model(String),
}
