//! Submission to the external rewriting service.
//!
//! Request: `POST <endpoint>` with a multipart body
//!
//! | Field | Content |
//! |-------|---------|
//! | `pdf` | original file bytes, `application/pdf` |
//! | `edits` | JSON array of [`EditDiff`] |
//!
//! A 2xx response carries the edited PDF. Anything else is surfaced as
//! `status + body` verbatim.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::collect::EditDiff;
use crate::config::EditorConfig;
use crate::error::{EditorError, Result, ServiceError};
use crate::session::SourceFile;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// The rewritten document, ready to be offered for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedPdf {
    pub file_name: String,
    pub bytes: Bytes,
}

impl EditedPdf {
    /// Write the document into `dir` under its download name.
    ///
    /// Bytes go to a temporary sibling first and are renamed into place, so
    /// a partially written file is never left under the final name.
    pub async fn save_into(&self, dir: &Path) -> Result<PathBuf> {
        let target = dir.join(&self.file_name);
        let partial = PartialFile::new(dir.join(format!(".{}.part", self.file_name)));

        tokio::fs::write(partial.path(), &self.bytes).await?;
        tokio::fs::rename(partial.path(), &target).await?;
        partial.commit();

        info!(path = %target.display(), bytes = self.bytes.len(), "edited PDF saved");
        Ok(target)
    }
}

/// Removes the temporary file on drop unless committed.
struct PartialFile {
    path: PathBuf,
    committed: bool,
}

impl PartialFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Name the edited download after the original file.
#[must_use]
pub fn download_name(prefix: &str, original: &str) -> String {
    format!("{prefix}{original}")
}

/// Applies position-addressed edits to a document.
#[async_trait]
pub trait Rewriter: Send + Sync {
    async fn rewrite(&self, file: &SourceFile, edits: &[EditDiff]) -> Result<EditedPdf>;
}

/// HTTP client for the rewriting service.
pub struct RewriteClient {
    client: Client,
    endpoint: Url,
    download_prefix: String,
}

impl RewriteClient {
    pub fn new(config: &EditorConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| EditorError::Endpoint(format!("{}: {e}", config.endpoint)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(EditorError::Endpoint(format!(
                "{}: unsupported scheme",
                config.endpoint
            )));
        }

        let client = Client::builder()
            .use_rustls_tls()
            .gzip(true)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ServiceError::Transport)?;

        Ok(Self {
            client,
            endpoint,
            download_prefix: config.download_prefix.clone(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn build_form(file: &SourceFile, edits: &[EditDiff]) -> Result<Form> {
        let pdf = Part::stream(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str("application/pdf")
            .map_err(ServiceError::Transport)?;
        let edits = serde_json::to_string(edits)?;
        Ok(Form::new().part("pdf", pdf).text("edits", edits))
    }
}

#[async_trait]
impl Rewriter for RewriteClient {
    #[instrument(skip_all, fields(endpoint = %self.endpoint, file = %file.name, edits = edits.len()))]
    async fn rewrite(&self, file: &SourceFile, edits: &[EditDiff]) -> Result<EditedPdf> {
        let form = Self::build_form(file, edits)?;
        debug!("Submitting edits");

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(ServiceError::Transport)?;

        let status = response.status();
        info!(status = %status, "Response received");

        if !status.is_success() {
            let body = read_error_body(response).await;
            warn!(status = status.as_u16(), body = %body, "rewriting service rejected edits");
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| EditorError::ResponseFormat(format!("failed to read body: {e}")))?;
        if bytes.is_empty() {
            return Err(EditorError::ResponseFormat("empty response body".to_string()));
        }
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(EditorError::ResponseFormat(
                "response body is not a PDF document".to_string(),
            ));
        }

        Ok(EditedPdf {
            file_name: download_name(&self.download_prefix, &file.name),
            bytes,
        })
    }
}

/// Read an error response body, keeping whatever arrived if the body is cut
/// short.
async fn read_error_body(mut response: reqwest::Response) -> String {
    let mut received = Vec::new();
    let failure = loop {
        match response.chunk().await {
            Ok(Some(chunk)) => received.extend_from_slice(&chunk),
            Ok(None) => break None,
            Err(e) => break Some(e),
        }
    };

    let body = String::from_utf8_lossy(&received).into_owned();
    match failure {
        None => body,
        Some(e) if body.is_empty() => format!("<unreadable body: {e}>"),
        Some(e) => format!("{body} <unreadable body: {e}>"),
    }
}
