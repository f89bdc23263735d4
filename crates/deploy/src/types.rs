//! Data types for the pack and upload flow.

use std::fmt;
use std::path::PathBuf;

use denpush_transfer::ProgressSnapshot;

/// Pipeline stage, as reported in [`PipelineEvent`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Archiving,
    Compressing,
    Authenticating,
    Uploading,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Archiving => "archiving",
            Stage::Compressing => "compressing",
            Stage::Authenticating => "authenticating",
            Stage::Uploading => "uploading",
        };
        f.write_str(label)
    }
}

/// Progress event emitted while a pipeline runs.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// A stage started.
    Stage(Stage),
    /// Bytes moved within a stage.
    Progress {
        stage: Stage,
        snapshot: ProgressSnapshot,
    },
    /// A file was produced on disk.
    Finished { path: PathBuf },
}

/// Login settings for APIs that require a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    /// Endpoint path, joined to the upload URL's scheme and authority.
    pub endpoint: String,
    pub username: String,
    pub password: String,
}

/// Everything the upload flow needs besides the pipeline's own settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Upload URL; `https://` is assumed when no scheme is given.
    pub url: String,
    /// Directory to pack. `None` means the working directory.
    pub source: Option<PathBuf>,
    pub credentials: Option<LoginCredentials>,
    /// User-facing compression level, 1–100.
    pub level: u8,
    /// Application version sent as the `version` part when non-empty.
    pub version: Option<String>,
}

/// Compressed output of a pack run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedArtifact {
    pub path: PathBuf,
    /// Compressed size in bytes.
    pub size: u64,
    /// Hex SHA-256 of the compressed file.
    pub sha256: String,
}

/// Result of the upload step. Never an error: failures are reported and
/// the artifact stays on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded { status: u16 },
    Failed { reason: String },
}

impl UploadOutcome {
    pub fn is_uploaded(&self) -> bool {
        matches!(self, UploadOutcome::Uploaded { .. })
    }
}

/// Result of the full upload flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub artifact: PackedArtifact,
    pub outcome: UploadOutcome,
}
