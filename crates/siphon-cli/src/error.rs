use thiserror::Error;

/// CLI-level failures. Anything surfacing here aborts the run with the
/// ambient failure exit code; partial reconciliation is not an error but an
/// exit-code-2 outcome.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] siphon_core::ValidationError),

    #[error(transparent)]
    Transfer(#[from] siphon_core::TransferError),

    #[error("failed to persist report artifact: {0}")]
    Report(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}
