//! # fastdata-client
//!
//! Client side of FastData: uploads files through `__fastdata_fastfs` and
//! maintains a follow graph through `__fastdata_kv`, reading it back from the
//! KV indexer. Signing is delegated to an external wallet implementing
//! [`SessionProvider`].

pub mod config;
pub mod error;
pub mod events;
pub mod kv_api;
pub mod session;
pub mod social;
pub mod state;
pub mod upload;

#[cfg(test)]
mod test_support;

use tracing_subscriber::{fmt, EnvFilter};

pub use config::ClientConfig;
pub use error::{ClientError, SessionError, UploadError, ValidationError};
pub use events::{SocialNotification, UploadEvent};
pub use kv_api::KvApi;
pub use session::{
    CallRejection, FunctionArgs, FunctionCall, Session, SessionContext, SessionProvider,
};
pub use social::{spawn_social_graph, SocialHandle, SocialSnapshot, TransactionOutcome};
pub use state::ClientState;
pub use upload::{SelectedFile, UploadFile, UploadStatus, Uploader};

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the
/// default filter. Calling it twice is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("fastdata_client=debug,fastdata_store=info,warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();

    tracing::info!(app = fastdata_shared::constants::APP_NAME, "Tracing initialised");
}
