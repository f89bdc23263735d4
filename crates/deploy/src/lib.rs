//! Pack, authenticate and upload flow.
//!
//! # Pipeline
//!
//! 1. **Archive**: tar the source directory
//! 2. **Compress**: zstd the archive at a mapped level, then delete it
//! 3. **Authenticate**: optionally exchange credentials for a token
//! 4. **Upload**: multipart POST of the artifact and its manifest
//!
//! Steps 1–2 are fatal on error. A failed upload is reported, not raised,
//! and the artifact is kept on disk.

pub mod auth;
pub mod deploy;
pub mod error;
pub mod http;
pub mod manifest;
pub mod types;
pub mod upload;
pub mod url;

#[cfg(test)]
mod test_support;

pub use auth::{AuthClient, AuthToken};
pub use deploy::{DEFAULT_ARTIFACT_NAME, Pipeline};
pub use error::DeployError;
pub use http::{DEFAULT_USER_AGENT, HttpSettings};
pub use manifest::build_manifest;
pub use types::{
    LoginCredentials, PackedArtifact, PipelineEvent, Stage, UploadOutcome, UploadReport,
    UploadRequest,
};
pub use upload::Uploader;
pub use url::{login_endpoint, normalize_url};
