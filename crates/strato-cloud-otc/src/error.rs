//! Open Telekom Cloud provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OtcError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API request failed with HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Job {0} failed: {1}")]
    JobFailed(String, String),

    #[error("Query returned no results: {0}")]
    NoMatch(String),

    #[error("Query matched more than one result: {0}")]
    MultipleMatches(String),

    #[error("Response value error: {0}")]
    Path(#[from] strato_cloud::PathError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cloud error: {0}")]
    Cloud(#[from] strato_cloud::CloudError),
}

pub type Result<T> = std::result::Result<T, OtcError>;

// Trait methods speak the provider-neutral error type, so provider-specific
// failures fold into it here. Variants with a neutral counterpart keep their
// kind; the rest surface as API errors with the full message.
impl From<OtcError> for strato_cloud::CloudError {
    fn from(e: OtcError) -> Self {
        use strato_cloud::CloudError;
        match e {
            OtcError::MissingEnvVar(_) | OtcError::InvalidConfig(_) => {
                CloudError::InvalidConfig(e.to_string())
            }
            OtcError::AuthenticationFailed(msg) => CloudError::AuthenticationFailed(msg),
            OtcError::ResourceNotFound(what) | OtcError::NoMatch(what) => {
                CloudError::ResourceNotFound(what)
            }
            OtcError::Path(e) => CloudError::Path(e),
            OtcError::Json(e) => CloudError::Json(e),
            OtcError::Cloud(e) => e,
            other => CloudError::ApiError(other.to_string()),
        }
    }
}
