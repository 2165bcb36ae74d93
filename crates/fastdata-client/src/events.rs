use serde::Serialize;
use tokio::sync::mpsc;

use fastdata_shared::TxHash;

use crate::social::{SocialSnapshot, TransactionOutcome};
use crate::upload::UploadStatus;

/// Notifications sent *from* the social graph task to the application.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SocialNotification {
    /// A follow/unfollow was committed locally.
    Outcome(TransactionOutcome),
    /// The following/followers lists were reloaded.
    Reloaded(SocialSnapshot),
    /// The indexer went up or down.
    ApiAvailability { available: bool },
}

/// Status change of one file in an upload batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadEvent {
    pub file_id: String,
    pub relative_path: String,
    pub status: UploadStatus,
    pub url: Option<String>,
    pub tx_hash: Option<TxHash>,
}

/// Forward `payload` to whoever listens. A dropped receiver is not an error.
pub fn emit_event<T: std::fmt::Debug>(tx: &mpsc::UnboundedSender<T>, payload: T) {
    if let Err(e) = tx.send(payload) {
        tracing::debug!(event = ?e.0, "Event receiver dropped");
    }
}
