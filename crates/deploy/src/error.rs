//! Deploy error types.

use denpush_pack::PackError;

/// Fatal errors of the pipeline.
///
/// A failed upload is not one of them: it is reported as
/// [`UploadOutcome::Failed`](crate::UploadOutcome::Failed).
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error(transparent)]
    Pack(#[from] PackError),

    #[error("token request rejected with status {status}")]
    AuthFailed { status: u16 },

    #[error("token request failed: {0}")]
    AuthTransport(#[source] reqwest::Error),

    #[error("malformed token response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
