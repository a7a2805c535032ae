//! Error types for claimcheck.
//!
//! Each subsystem has its own error enum; [`Error`] aggregates them for
//! callers that only need a single error type (the CLI layer).

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Checkpoint store failure.
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    /// External provider failure (reasoning or record provider).
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Pipeline orchestration failure.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Result artifact failure.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// CLI command failure.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a [`CheckpointStore`](crate::checkpoint::CheckpointStore).
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// No checkpoint exists for the requested job identity.
    #[error("checkpoint '{id}' does not exist")]
    NotFound {
        /// Job identity that was requested.
        id: String,
    },

    /// A checkpoint write or read failed at the storage layer.
    #[error("failed to persist checkpoint '{id}': {message}")]
    Persistence {
        /// Job identity being written.
        id: String,
        /// Underlying failure description.
        message: String,
    },

    /// Checkpoint content could not be (de)serialized.
    #[error("checkpoint serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// SQLite backend failure.
    #[cfg(feature = "sqlite")]
    #[error("checkpoint database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Errors raised while calling an external provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network, rate-limit, or non-success HTTP response.
    #[error("{provider} request failed: {message}")]
    Transient {
        /// Provider name.
        provider: String,
        /// Error description.
        message: String,
        /// HTTP status code, when one was received.
        status: Option<u16>,
    },

    /// The provider returned text with no extractable JSON.
    #[error("could not parse response as JSON: {message} (response starts with: {preview:?})")]
    Unparsable {
        /// Reason the last parse strategy failed.
        message: String,
        /// First characters of the raw response.
        preview: String,
    },

    /// The provider returned JSON that does not match the expected schema.
    #[error("unexpected response format: {message}")]
    Malformed {
        /// Description of the schema violation.
        message: String,
    },

    /// No API key was configured for a provider.
    #[error("no API key configured for {provider} (set {env_var})")]
    ApiKeyMissing {
        /// Provider name.
        provider: String,
        /// Environment variable that supplies the key.
        env_var: String,
    },

    /// Unknown provider name in configuration.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// The configured provider name.
        name: String,
    },

    /// The request could not be constructed.
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// Error description.
        message: String,
    },
}

impl ProviderError {
    /// Returns `true` if retrying the same call may succeed.
    ///
    /// Configuration errors fail immediately; transport and response-shape
    /// errors are retried per the caller's [`RetryPolicy`](crate::retry::RetryPolicy).
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transient { .. } | Self::Unparsable { .. } | Self::Malformed { .. }
        )
    }

    /// Builds a [`ProviderError::Unparsable`] with a short response preview.
    #[must_use]
    pub fn unparsable(message: impl Into<String>, response: &str) -> Self {
        const PREVIEW_CHARS: usize = 50;
        Self::Unparsable {
            message: message.into(),
            preview: response.trim().chars().take(PREVIEW_CHARS).collect(),
        }
    }
}

/// Errors raised by the pipeline orchestrator.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Caller supplied unusable input.
    #[error("invalid input: {message}")]
    Input {
        /// Error description.
        message: String,
    },

    /// A checkpoint exists but its payload has an unexpected shape.
    #[error("checkpoint '{id}' has an unexpected payload: {message}")]
    InvalidCheckpoint {
        /// Job identity.
        id: String,
        /// Error description.
        message: String,
    },

    /// A stage result could not be serialized into a checkpoint payload.
    #[error("result serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Checkpoint store failure.
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    /// Provider failure that exhausted its retry policy.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Result artifact failure.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Errors raised while writing result artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Could not create the results directory or write the file.
    #[error("failed to write result artifact '{name}': {message}")]
    Write {
        /// Artifact name (without extension).
        name: String,
        /// Error description.
        message: String,
    },

    /// The payload could not be serialized.
    #[error("result serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// CLI command errors.
#[derive(Debug, Error)]
pub enum CommandError {
    /// An argument combination is invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Command execution failed.
    #[error("{0}")]
    ExecutionFailed(String),

    /// Output formatting failed.
    #[error("output formatting failed: {0}")]
    OutputFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let transient = ProviderError::Transient {
            provider: "lens".to_string(),
            message: "timeout".to_string(),
            status: None,
        };
        assert!(transient.is_retryable());
        assert!(ProviderError::unparsable("no json", "hello").is_retryable());
        assert!(
            ProviderError::Malformed {
                message: "missing".to_string()
            }
            .is_retryable()
        );
        assert!(
            !ProviderError::ApiKeyMissing {
                provider: "lens".to_string(),
                env_var: "LENS_API_KEY".to_string()
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_unparsable_preview_truncated() {
        let long = "x".repeat(500);
        let err = ProviderError::unparsable("bad", &long);
        if let ProviderError::Unparsable { preview, .. } = err {
            assert_eq!(preview.len(), 50);
        } else {
            unreachable!();
        }
    }

    #[test]
    fn test_not_found_display() {
        let err = CheckpointError::NotFound {
            id: "abc123".to_string(),
        };
        assert_eq!(err.to_string(), "checkpoint 'abc123' does not exist");
    }

    #[test]
    fn test_error_from_conversions() {
        let err: Error = CommandError::InvalidArgument("x".to_string()).into();
        assert!(matches!(err, Error::Command(_)));
        let err: PipelineError = ProviderError::Malformed {
            message: "m".to_string(),
        }
        .into();
        assert!(matches!(err, PipelineError::Provider(_)));
    }

    #[test]
    fn test_serialize_failure_is_not_a_bad_checkpoint() {
        let Err(json_err) = serde_json::from_str::<u8>("nope") else {
            unreachable!();
        };
        let err: PipelineError = json_err.into();
        assert!(matches!(err, PipelineError::Serialize(_)));
        assert!(err.to_string().starts_with("result serialization error"));
    }
}
