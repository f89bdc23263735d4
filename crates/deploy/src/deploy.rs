//! Pipeline orchestrator: archive, compress, authenticate and upload.
//!
//! Disk stages run on the blocking pool one after another; each finishes
//! with its file on disk before the next starts. Progress is published on
//! an unbounded event channel.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use denpush_pack::{
    ARCHIVE_EXTENSION, COMPRESSED_EXTENSION, PackError, compress_file, create_archive,
    generate_unique_file_name_with, map_level, resolve_source_dir, with_extension_if_missing,
};
use denpush_transfer::{
    ProgressObserver, ProgressSnapshot, SharedObserver, calculate_file_checksum,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::auth::AuthClient;
use crate::error::DeployError;
use crate::http::HttpSettings;
use crate::manifest::build_manifest;
use crate::types::{PackedArtifact, PipelineEvent, Stage, UploadReport, UploadRequest};
use crate::upload::Uploader;
use crate::url::{login_endpoint, normalize_url};

/// Base name of the artifact the upload flow produces.
pub const DEFAULT_ARTIFACT_NAME: &str = "appBinaries";

/// Forwards tracker snapshots to the event channel, tagged with a stage.
struct StageForwarder {
    stage: Stage,
    events_tx: mpsc::UnboundedSender<PipelineEvent>,
}

impl ProgressObserver for StageForwarder {
    fn on_progress(&self, snapshot: &ProgressSnapshot) {
        let _ = self.events_tx.send(PipelineEvent::Progress {
            stage: self.stage,
            snapshot: *snapshot,
        });
    }
}

/// Runs the tar, pack and upload flows.
pub struct Pipeline {
    working_dir: PathBuf,
    artifact_name: String,
    http: HttpSettings,
    events_tx: mpsc::UnboundedSender<PipelineEvent>,
    events_rx: Option<mpsc::UnboundedReceiver<PipelineEvent>>,
}

impl Pipeline {
    /// Creates a pipeline rooted at `working_dir`.
    ///
    /// Relative destinations and sources resolve against it, and the
    /// upload flow writes its artifact and builds its manifest there.
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            working_dir: working_dir.into(),
            artifact_name: DEFAULT_ARTIFACT_NAME.to_string(),
            http: HttpSettings::default(),
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    pub fn with_http_settings(mut self, http: HttpSettings) -> Self {
        self.http = http;
        self
    }

    pub fn with_artifact_name(mut self, name: impl Into<String>) -> Self {
        self.artifact_name = name.into();
        self
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<PipelineEvent>> {
        self.events_rx.take()
    }

    /// Archives `source` (default: the working directory) into
    /// `destination`, appending `.tar` when missing. Returns the archive path.
    pub async fn archive(
        &self,
        destination: &Path,
        source: Option<&Path>,
    ) -> Result<PathBuf, DeployError> {
        let destination = self.working_dir.join(destination);
        let source = resolve_source_dir(source, &self.working_dir);
        self.run_archive(destination, source).await
    }

    /// Archives, then compresses at user `level` (1–100), then deletes the
    /// intermediate archive.
    ///
    /// The compressed file is the archive name plus `.zstd`, unless that is
    /// already part of the name. Its path is checked for collisions before
    /// archiving starts.
    pub async fn pack(
        &self,
        destination: &Path,
        source: Option<&Path>,
        level: u8,
    ) -> Result<PackedArtifact, DeployError> {
        let destination = self.working_dir.join(destination);
        let source = resolve_source_dir(source, &self.working_dir);

        let planned_archive = with_extension_if_missing(&destination, ARCHIVE_EXTENSION);
        let compressed = compressed_destination(&destination, &planned_archive);
        if compressed.exists() {
            return Err(PackError::DestinationExists { path: compressed }.into());
        }

        let archive = self.run_archive(destination, source).await?;

        self.emit(PipelineEvent::Stage(Stage::Compressing));
        let native_level = map_level(level);
        let observer = self.observer(Stage::Compressing);
        let input = archive.clone();
        let output = compressed.clone();
        let size = tokio::task::spawn_blocking(move || {
            compress_file(&input, &output, native_level, observer)
        })
        .await??;

        tokio::fs::remove_file(&archive).await?;
        debug!(archive = %archive.display(), "removed intermediate archive");

        let checksum_path = compressed.clone();
        let sha256 =
            tokio::task::spawn_blocking(move || calculate_file_checksum(&checksum_path)).await??;

        info!(
            artifact = %compressed.display(),
            level,
            native_level,
            size,
            sha256 = %sha256,
            "pack completed"
        );
        self.emit(PipelineEvent::Finished {
            path: compressed.clone(),
        });

        Ok(PackedArtifact {
            path: compressed,
            size,
            sha256,
        })
    }

    /// Packs into a fresh `<artifact name>[N].tar.zstd` in the working
    /// directory, builds the manifest, obtains a token when credentials are
    /// given, and uploads.
    ///
    /// Packing and token errors are fatal. An upload failure is reported in
    /// the returned [`UploadReport`]. The artifact is kept either way.
    pub async fn upload(&self, request: UploadRequest) -> Result<UploadReport, DeployError> {
        let url = normalize_url(&request.url)?;
        let login = request
            .credentials
            .as_ref()
            .map(|creds| login_endpoint(&url, &creds.endpoint))
            .transpose()?;

        let derived = [
            String::new(),
            ARCHIVE_EXTENSION.to_string(),
            format!("{ARCHIVE_EXTENSION}{COMPRESSED_EXTENSION}"),
        ];
        let derived: Vec<&str> = derived.iter().map(String::as_str).collect();
        let base = generate_unique_file_name_with(&self.working_dir, &self.artifact_name, &derived);
        debug!(base = %base, "artifact name chosen");

        let artifact = self
            .pack(Path::new(&base), request.source.as_deref(), request.level)
            .await?;

        let source = resolve_source_dir(request.source.as_deref(), &self.working_dir);
        if source != self.working_dir {
            warn!(
                source = %source.display(),
                working_dir = %self.working_dir.display(),
                "manifest lists the working directory, not the packed source"
            );
        }
        let manifest_dir = self.working_dir.clone();
        let manifest = tokio::task::spawn_blocking(move || build_manifest(&manifest_dir)).await??;

        let token = match (request.credentials.as_ref(), login) {
            (Some(creds), Some(endpoint)) => {
                self.emit(PipelineEvent::Stage(Stage::Authenticating));
                let auth = AuthClient::new(self.http.build()?);
                Some(
                    auth.get_token(&creds.username, &creds.password, &endpoint)
                        .await?,
                )
            }
            _ => None,
        };

        self.emit(PipelineEvent::Stage(Stage::Uploading));
        let uploader = Uploader::new(self.http.build()?);
        let outcome = uploader
            .upload(
                &url,
                &artifact.path,
                manifest,
                request.version.as_deref(),
                token.as_ref(),
                self.observer(Stage::Uploading),
            )
            .await;

        Ok(UploadReport { artifact, outcome })
    }

    async fn run_archive(
        &self,
        destination: PathBuf,
        source: PathBuf,
    ) -> Result<PathBuf, DeployError> {
        self.emit(PipelineEvent::Stage(Stage::Archiving));
        let observer = self.observer(Stage::Archiving);
        let summary =
            tokio::task::spawn_blocking(move || create_archive(&destination, &source, observer))
                .await??;

        info!(
            archive = %summary.path.display(),
            entries = summary.entries,
            bytes = summary.bytes,
            "archive created"
        );
        self.emit(PipelineEvent::Finished {
            path: summary.path.clone(),
        });
        Ok(summary.path)
    }

    fn observer(&self, stage: Stage) -> SharedObserver {
        Arc::new(StageForwarder {
            stage,
            events_tx: self.events_tx.clone(),
        })
    }

    fn emit(&self, event: PipelineEvent) {
        let _ = self.events_tx.send(event);
    }
}

/// Compressed output path for a pack of `destination` archived at `archive`.
///
/// `.zstd` is appended to the archive name unless the name already carries
/// it, in which case the requested destination is used as given. When that
/// would be the archive itself, `.zstd` is appended regardless.
fn compressed_destination(destination: &Path, archive: &Path) -> PathBuf {
    let candidate = with_extension_if_missing(archive, COMPRESSED_EXTENSION);
    if candidate != archive {
        return candidate;
    }
    if destination != archive {
        return destination.to_path_buf();
    }
    let mut name = archive.as_os_str().to_os_string();
    name.push(COMPRESSED_EXTENSION);
    PathBuf::from(name)
}
