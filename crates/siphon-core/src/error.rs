//! Error taxonomy for the transfer engine.

use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::http_client::HttpError;

/// Validation errors raised when constructing domain values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("external_id cannot be empty")]
    EmptyExternalId,

    #[error("base URL cannot be empty")]
    EmptyBaseUrl,

    #[error("timestamp must be RFC3339 UTC: '{value}'")]
    TimestampNotUtc { value: String },
}

/// Classification of one failed attempt, as seen by the retry executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFault {
    /// Timeout or connection-level failure.
    Transport(HttpError),
    /// Retryable HTTP status (408, 429, or 5xx).
    Status(u16),
}

impl Display for AttemptFault {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(error) => write!(f, "transport fault: {error}"),
            Self::Status(status) => write!(f, "server responded with status {status}"),
        }
    }
}

/// Failures surfaced by the transfer engine.
///
/// During pagination any of these aborts the run before a single write
/// happens; during reconciliation they are absorbed per record into the
/// failed tally.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Non-retryable response status, surfaced on first sight.
    #[error("request to {url} was rejected with status {status}")]
    FatalStatus { url: String, status: u16 },

    /// Transport failure the client marked as not worth retrying.
    #[error("transport failure for {url}: {source}")]
    Transport { url: String, source: HttpError },

    /// The retry budget ran out without a satisfying response.
    #[error("giving up on {url} after {attempts} attempts: {cause}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        cause: AttemptFault,
    },

    /// A wire payload could not be encoded or decoded.
    #[error("malformed payload for {url}: {source}")]
    Codec {
        url: String,
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempt_faults_render_their_classification() {
        let status = AttemptFault::Status(503);
        assert_eq!(status.to_string(), "server responded with status 503");

        let transport = AttemptFault::Transport(HttpError::new("connection refused"));
        assert_eq!(transport.to_string(), "transport fault: connection refused");
    }

    #[test]
    fn exhaustion_carries_the_last_fault() {
        let error = TransferError::RetriesExhausted {
            url: String::from("http://source.test/items"),
            attempts: 6,
            cause: AttemptFault::Status(429),
        };

        let rendered = error.to_string();
        assert!(rendered.contains("after 6 attempts"), "{rendered}");
        assert!(rendered.contains("status 429"), "{rendered}");
    }
}
