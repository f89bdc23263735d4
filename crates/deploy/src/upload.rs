//! Multipart upload of a packed artifact.

use std::path::{Path, PathBuf};

use denpush_transfer::{ProgressReader, STREAM_BUFFER_SIZE, SharedObserver};
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{StatusCode, Url};
use tokio_util::io::ReaderStream;
use tracing::{error, info};

use crate::auth::AuthToken;
use crate::types::UploadOutcome;

const OCTET_STREAM: &str = "application/octet-stream";
const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

#[derive(Debug, thiserror::Error)]
enum UploadFailure {
    #[error("cannot open artifact {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server responded with {0}")]
    Status(StatusCode),
}

/// Sends an artifact, its manifest and an optional version in one
/// multipart POST.
pub struct Uploader {
    http: reqwest::Client,
}

impl Uploader {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Uploads `artifact` to `url`.
    ///
    /// Parts: `file` (the artifact, streamed from disk), `files` (the
    /// manifest) and `version` when non-empty. The token, if any, goes in
    /// the `Authorization` header. Failures are logged and returned as
    /// [`UploadOutcome::Failed`]; the artifact is left untouched.
    pub async fn upload(
        &self,
        url: &Url,
        artifact: &Path,
        manifest: String,
        version: Option<&str>,
        token: Option<&AuthToken>,
        observer: SharedObserver,
    ) -> UploadOutcome {
        match self
            .send(url, artifact, manifest, version, token, observer)
            .await
        {
            Ok(status) => {
                info!(url = %url, status = status.as_u16(), "file uploaded");
                UploadOutcome::Uploaded {
                    status: status.as_u16(),
                }
            }
            Err(e) => {
                let reason = e.to_string();
                error!(
                    url = %url,
                    artifact = %artifact.display(),
                    error = %reason,
                    "upload failed"
                );
                UploadOutcome::Failed { reason }
            }
        }
    }

    async fn send(
        &self,
        url: &Url,
        artifact: &Path,
        manifest: String,
        version: Option<&str>,
        token: Option<&AuthToken>,
        observer: SharedObserver,
    ) -> Result<StatusCode, UploadFailure> {
        let open_failed = |source| UploadFailure::Open {
            path: artifact.to_path_buf(),
            source,
        };
        let file = tokio::fs::File::open(artifact).await.map_err(open_failed)?;
        let len = file.metadata().await.map_err(open_failed)?.len();

        let file_name = artifact
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let reader = ProgressReader::new(file, len, observer);
        let stream = ReaderStream::with_capacity(reader, STREAM_BUFFER_SIZE);
        let file_part = Part::stream_with_length(reqwest::Body::wrap_stream(stream), len)
            .file_name(file_name)
            .mime_str(OCTET_STREAM)?;

        let mut form = Form::new()
            .part("file", file_part)
            .part("files", Part::text(manifest).mime_str(TEXT_PLAIN_UTF8)?);
        if let Some(version) = version.filter(|v| !v.is_empty()) {
            form = form.part(
                "version",
                Part::text(version.to_string()).mime_str(TEXT_PLAIN_UTF8)?,
            );
        }

        let mut request = self.http.post(url.clone()).multipart(form);
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, token.authorization());
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(UploadFailure::Status(status));
        }
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{closed_port, mock_server};
    use denpush_transfer::ProgressSnapshot;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn quiet() -> SharedObserver {
        Arc::new(|_: &ProgressSnapshot| {})
    }

    fn artifact(dir: &TempDir, len: usize) -> PathBuf {
        let path = dir.path().join("appBinaries.tar.zstd");
        let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, data).unwrap();
        path
    }

    fn token() -> AuthToken {
        AuthToken {
            token_type: "Bearer".into(),
            access_token: "t0k3n".into(),
        }
    }

    #[tokio::test]
    async fn upload_sends_expected_parts() {
        let dir = TempDir::new().unwrap();
        let path = artifact(&dir, 1000);
        let (url, handle) = mock_server(200, "{}").await;
        let url = Url::parse(&format!("{url}/api/upload")).unwrap();

        let outcome = Uploader::new(reqwest::Client::new())
            .upload(
                &url,
                &path,
                "a.txt\nsub/b.txt\n".into(),
                Some("1.2.3"),
                Some(&token()),
                quiet(),
            )
            .await;
        assert_eq!(outcome, UploadOutcome::Uploaded { status: 200 });

        let request = handle.await.unwrap();
        assert!(request.head.starts_with("POST /api/upload HTTP/1.1"));
        assert_eq!(request.header("authorization"), Some("Bearer t0k3n"));
        assert!(
            request
                .header("content-type")
                .unwrap()
                .starts_with("multipart/form-data; boundary=")
        );

        let text = request.body_text();
        let lower = text.to_ascii_lowercase();
        assert!(text.contains(r#"name="file"; filename="appBinaries.tar.zstd""#));
        assert!(lower.contains("content-type: application/octet-stream"));
        assert!(text.contains(r#"name="files""#));
        assert!(text.contains("a.txt\nsub/b.txt\n"));
        assert!(lower.contains("content-type: text/plain; charset=utf-8"));
        assert!(text.contains(r#"name="version""#));
        assert!(text.contains("1.2.3"));

        let payload = std::fs::read(&path).unwrap();
        assert!(request.body.windows(payload.len()).any(|w| w == payload));
    }

    #[tokio::test]
    async fn upload_without_token_or_version() {
        let dir = TempDir::new().unwrap();
        let path = artifact(&dir, 10);
        let (url, handle) = mock_server(201, "").await;
        let url = Url::parse(&url).unwrap();

        let outcome = Uploader::new(reqwest::Client::new())
            .upload(&url, &path, String::new(), Some(""), None, quiet())
            .await;
        assert!(outcome.is_uploaded());

        let request = handle.await.unwrap();
        assert!(request.header("authorization").is_none());
        assert!(!request.body_text().contains(r#"name="version""#));
    }

    #[tokio::test]
    async fn server_error_is_reported_not_raised() {
        let dir = TempDir::new().unwrap();
        let path = artifact(&dir, 4096);
        let before = std::fs::read(&path).unwrap();
        let (url, handle) = mock_server(500, r#"{"error":"boom"}"#).await;
        let url = Url::parse(&url).unwrap();

        let outcome = Uploader::new(reqwest::Client::new())
            .upload(&url, &path, String::new(), None, None, quiet())
            .await;

        match outcome {
            UploadOutcome::Failed { reason } => assert!(reason.contains("500"), "{reason}"),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(std::fs::read(&path).unwrap(), before);
        handle.abort();
    }

    #[tokio::test]
    async fn unreachable_server_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = artifact(&dir, 10);
        let port = closed_port().await;
        let url = Url::parse(&format!("http://127.0.0.1:{port}/upload")).unwrap();

        let outcome = Uploader::new(reqwest::Client::new())
            .upload(&url, &path, String::new(), None, None, quiet())
            .await;
        assert!(matches!(outcome, UploadOutcome::Failed { .. }));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn missing_artifact_is_reported() {
        let dir = TempDir::new().unwrap();
        let url = Url::parse("http://127.0.0.1:9/upload").unwrap();

        let outcome = Uploader::new(reqwest::Client::new())
            .upload(
                &url,
                &dir.path().join("gone.tar.zstd"),
                String::new(),
                None,
                None,
                quiet(),
            )
            .await;
        match outcome {
            UploadOutcome::Failed { reason } => assert!(reason.contains("cannot open artifact")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn progress_reaches_artifact_size() {
        let dir = TempDir::new().unwrap();
        let path = artifact(&dir, 300 * 1024);
        let (url, handle) = mock_server(200, "{}").await;
        let url = Url::parse(&url).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let observer: SharedObserver = Arc::new(move |s: &ProgressSnapshot| {
            sink.lock().unwrap().push(s.bytes_transferred);
        });

        let outcome = Uploader::new(reqwest::Client::new())
            .upload(&url, &path, String::new(), None, None, observer)
            .await;
        assert!(outcome.is_uploaded());
        handle.await.unwrap();

        let seen = seen.lock().unwrap();
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*seen.last().unwrap(), 300 * 1024);
    }
}
