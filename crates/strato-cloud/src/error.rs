//! Cloud provider error types

use std::time::Duration;

use thiserror::Error;

/// Errors shared by all cloud providers
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Resource already exists: {0}")]
    ResourceAlreadyExists(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("State file error: {0}")]
    StateError(String),

    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    /// No terminal state was reported within the configured wait window.
    #[error("Timed out after {0:?} waiting for a terminal state")]
    WaitTimeout(Duration),

    /// The polled resource reported a state that is neither a target nor a
    /// pending state. The underlying operation has failed; not retried.
    #[error("Resource entered unexpected state {0:?}")]
    UnexpectedState(String),

    #[error("Response value error: {0}")]
    Path(#[from] crate::value::PathError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;
