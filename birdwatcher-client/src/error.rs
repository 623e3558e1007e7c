//! Error types for birdwatcher invocations.

use crate::config::ConfigError;

/// Marker the tool prints when it cannot reach etcd. Matched case-insensitively.
///
/// This is a textual contract with the tool's free-form diagnostics, not a
/// structured error code, and breaks if the tool rewords the message.
pub const CONNECTION_FAILURE_MARKER: &str = "failed to connect";

#[derive(Debug, thiserror::Error)]
pub enum BirdwatcherError {
    #[error("Failed to connect to etcd: {message}")]
    Connection { message: String },

    #[error("Command failed: {message}")]
    Command { message: String },

    #[error("Command timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Binary not found: {path} ({reason})")]
    BinaryMissing { path: String, reason: String },

    #[error("Failed to parse JSON: {source}\nOutput: {output}")]
    PayloadMalformed {
        #[source]
        source: serde_json::Error,
        output: String,
    },

    #[error("Unsupported platform: {os}-{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl BirdwatcherError {
    /// Classify the diagnostic text of a failed invocation.
    pub fn from_failure_text(text: impl Into<String>) -> Self {
        let message = text.into();
        if message.to_lowercase().contains(CONNECTION_FAILURE_MARKER) {
            Self::Connection { message }
        } else {
            Self::Command { message }
        }
    }

    /// Whether re-running `connect` may clear this failure.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Result type alias for birdwatcher operations.
pub type BirdwatcherResult<T> = Result<T, BirdwatcherError>;

// =============================================================================
// TESTS
// =============================================================================
