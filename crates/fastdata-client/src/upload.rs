//! FastFS uploads.
//!
//! Each file becomes one `__fastdata_fastfs` call carrying the Borsh-encoded
//! payload. All files of a batch are sent at once and awaited together.

use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use fastdata_shared::constants::FASTFS_METHOD;
use fastdata_shared::fastfs::{FastfsData, FastfsFileContent};
use fastdata_shared::{AccountId, EncodeError, TxHash};

use crate::config::ClientConfig;
use crate::error::{ClientError, UploadError};
use crate::events::{emit_event, UploadEvent};
use crate::session::{FunctionCall, SessionContext, SessionProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Success,
    Error,
}

impl UploadStatus {
    fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Uploading => 1,
            Self::Success | Self::Error => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }
}

/// A file picked by the user, not yet bound to an upload path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            content,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        let content = tokio::fs::read(path).await?;
        let mime_type = mime_from_name(&name).to_string();
        Ok(Self {
            name,
            mime_type,
            content,
        })
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}

fn mime_from_name(name: &str) -> &'static str {
    let ext = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("html" | "htm") => "text/html",
        Some("css") => "text/css",
        Some("js" | "mjs") => "text/javascript",
        Some("json") => "application/json",
        Some("csv") => "text/csv",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("pdf") => "application/pdf",
        Some("wasm") => "application/wasm",
        Some("mp3") => "audio/mpeg",
        Some("mp4") => "video/mp4",
        _ => "application/octet-stream",
    }
}

/// One file of an upload batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub id: String,
    pub status: UploadStatus,
    pub size: usize,
    pub relative_path: String,
    pub mime_type: String,
    pub content: Vec<u8>,
    pub tx_hash: Option<TxHash>,
    pub url: Option<String>,
    /// The wallet rejected the call. The payload may still be indexed.
    pub degraded: bool,
    pub error: Option<String>,
}

impl UploadFile {
    fn new(relative_path: String, file: SelectedFile) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            status: UploadStatus::Pending,
            size: file.content.len(),
            relative_path,
            mime_type: file.mime_type,
            content: file.content,
            tx_hash: None,
            url: None,
            degraded: false,
            error: None,
        }
    }

    /// Move to `next` if it is strictly later. Terminal states are final.
    pub fn advance(&mut self, next: UploadStatus) -> bool {
        if self.status.is_terminal() || next.rank() <= self.status.rank() {
            return false;
        }
        self.status = next;
        true
    }

    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        if !self.advance(UploadStatus::Error) {
            return false;
        }
        self.error = Some(message.into());
        true
    }

    fn payload(&self) -> FastfsData {
        FastfsData::simple(
            self.relative_path.clone(),
            Some(FastfsFileContent {
                mime_type: self.mime_type.clone(),
                content: self.content.clone(),
            }),
        )
    }

    fn event(&self) -> UploadEvent {
        UploadEvent {
            file_id: self.id.clone(),
            relative_path: self.relative_path.clone(),
            status: self.status,
            url: self.url.clone(),
            tx_hash: self.tx_hash.clone(),
        }
    }
}

pub type Encoder = fn(&FastfsData) -> Result<Vec<u8>, EncodeError>;

pub struct Uploader<P> {
    provider: Arc<P>,
    account: AccountId,
    contract_id: String,
    gas: u64,
    domain: String,
    max_files: usize,
    max_file_size: usize,
    encode: Encoder,
    events: Option<mpsc::UnboundedSender<UploadEvent>>,
}

impl<P: SessionProvider> Uploader<P> {
    pub fn new(ctx: &SessionContext, provider: Arc<P>, config: &ClientConfig) -> Self {
        Self {
            provider,
            account: ctx.account_id.clone(),
            contract_id: config.fastfs_contract_id.clone(),
            gas: config.fastfs_gas,
            domain: config.fastfs_domain.clone(),
            max_files: config.max_upload_files,
            max_file_size: config.max_upload_file_size,
            encode: FastfsData::to_bytes,
            events: None,
        }
    }

    pub fn with_encoder(mut self, encode: Encoder) -> Self {
        self.encode = encode;
        self
    }

    /// Receive an [`UploadEvent`] for every status change.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<UploadEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    /// Bind `files` under `relative_path`. One leading `/` is dropped, the
    /// file name is appended as is.
    pub fn prepare(
        &self,
        relative_path: &str,
        files: Vec<SelectedFile>,
    ) -> Result<Vec<UploadFile>, UploadError> {
        if files.is_empty() {
            return Err(UploadError::NoFiles);
        }
        if files.len() > self.max_files {
            return Err(UploadError::TooManyFiles {
                count: files.len(),
                max: self.max_files,
            });
        }
        if let Some(big) = files.iter().find(|f| f.size() > self.max_file_size) {
            return Err(UploadError::FileTooLarge {
                name: big.name.clone(),
                size: big.size(),
                max: self.max_file_size,
            });
        }

        let base = relative_path.strip_prefix('/').unwrap_or(relative_path);
        Ok(files
            .into_iter()
            .map(|file| UploadFile::new(format!("{base}{}", file.name), file))
            .collect())
    }

    /// Upload every pending file concurrently. No ordering, no retry.
    pub async fn upload_all(&self, files: &mut [UploadFile]) {
        let pending = files.iter().filter(|f| f.status == UploadStatus::Pending).count();
        info!(
            account = %self.account,
            files = pending,
            contract = %self.contract_id,
            "Uploading files"
        );

        join_all(
            files
                .iter_mut()
                .filter(|f| f.status == UploadStatus::Pending)
                .map(|f| self.upload_one(f)),
        )
        .await;
    }

    /// `https://<account>.<domain>/<contract>/<relative path>`
    pub fn file_url(&self, relative_path: &str) -> String {
        format!(
            "https://{}.{}/{}/{}",
            self.account, self.domain, self.contract_id, relative_path
        )
    }

    async fn upload_one(&self, file: &mut UploadFile) {
        file.advance(UploadStatus::Uploading);
        self.publish(file);

        let bytes = match (self.encode)(&file.payload()) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(path = %file.relative_path, error = %e, "Failed to encode upload");
                file.fail(e.to_string());
                self.publish(file);
                return;
            }
        };

        let call = FunctionCall::borsh(&self.contract_id, FASTFS_METHOD, bytes, self.gas);
        match self.provider.call_function(call).await {
            Ok(hash) => file.tx_hash = Some(hash),
            Err(rejection) => {
                warn!(
                    path = %file.relative_path,
                    error = %rejection.message,
                    "Wallet rejected upload, treating as sent"
                );
                file.tx_hash = rejection.recovered_tx_hash();
                file.degraded = true;
            }
        }

        file.url = Some(self.file_url(&file.relative_path));
        file.advance(UploadStatus::Success);
        self.publish(file);
    }

    fn publish(&self, file: &UploadFile) {
        if let Some(tx) = &self.events {
            emit_event(tx, file.event());
        }
    }
}
