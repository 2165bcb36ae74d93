//! Wallet session seam.
//!
//! The wallet itself (keys, signing and broadcast) lives outside
//! this crate behind [`SessionProvider`]. [`Session`] is the single owner of
//! the current [`SessionContext`]: the context is immutable, built on
//! sign-in, dropped on sign-out, and observed through a `watch` channel.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{info, warn};

use fastdata_shared::{AccountId, Network, TxHash};

use crate::error::SessionError;

/// Arguments of a function call, in the encoding the method expects.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionArgs {
    Json(serde_json::Value),
    Borsh(Vec<u8>),
}

impl FunctionArgs {
    /// Raw bytes as they go on the wire.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Json(value) => value.to_string().into_bytes(),
            Self::Borsh(bytes) => bytes.clone(),
        }
    }
}

/// A single function-call transaction for the wallet to sign and send.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub contract_id: String,
    pub method: String,
    pub args: FunctionArgs,
    pub gas: u64,
}

impl FunctionCall {
    pub fn json(
        contract_id: impl Into<String>,
        method: impl Into<String>,
        args: serde_json::Value,
        gas: u64,
    ) -> Self {
        Self {
            contract_id: contract_id.into(),
            method: method.into(),
            args: FunctionArgs::Json(args),
            gas,
        }
    }

    pub fn borsh(
        contract_id: impl Into<String>,
        method: impl Into<String>,
        args: Vec<u8>,
        gas: u64,
    ) -> Self {
        Self {
            contract_id: contract_id.into(),
            method: method.into(),
            args: FunctionArgs::Borsh(args),
            gas,
        }
    }
}

/// The wallet reported a failed call.
///
/// `__fastdata_*` methods do not exist on the receiving contracts, so the
/// wallet may report failure for a transaction whose data is still indexed.
/// Any hashes the wallet attached to the failure are kept.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct CallRejection {
    pub message: String,
    pub transaction_hashes: Vec<TxHash>,
}

impl CallRejection {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            transaction_hashes: Vec::new(),
        }
    }

    pub fn with_hashes(mut self, hashes: impl IntoIterator<Item = TxHash>) -> Self {
        self.transaction_hashes.extend(hashes);
        self
    }

    pub fn recovered_tx_hash(&self) -> Option<TxHash> {
        self.transaction_hashes.first().cloned()
    }
}

/// The external wallet connector.
pub trait SessionProvider: Send + Sync + 'static {
    /// Account currently signed in with the wallet, if any.
    fn account_id(&self) -> Option<AccountId>;

    fn sign_in(&self) -> impl Future<Output = Result<AccountId, SessionError>> + Send;

    fn sign_out(&self) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Sign and send `call`, resolving to the transaction hash.
    fn call_function(
        &self,
        call: FunctionCall,
    ) -> impl Future<Output = Result<TxHash, CallRejection>> + Send;
}

/// Everything a task needs to know about the signed-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub account_id: AccountId,
    pub network: Network,
    pub signed_in_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn new(account_id: AccountId, network: Network) -> Self {
        Self {
            account_id,
            network,
            signed_in_at: Utc::now(),
        }
    }
}

pub type SessionWatch = watch::Receiver<Option<Arc<SessionContext>>>;

/// Owner of the current session context.
pub struct Session<P> {
    provider: Arc<P>,
    network: Network,
    current: watch::Sender<Option<Arc<SessionContext>>>,
}

impl<P: SessionProvider> Session<P> {
    /// Picks up an account the wallet is already signed into.
    pub fn new(provider: Arc<P>, network: Network) -> Self {
        let initial = provider
            .account_id()
            .map(|account| Arc::new(SessionContext::new(account, network)));
        if let Some(ctx) = &initial {
            info!(account = %ctx.account_id, "Restored wallet session");
        }
        let (current, _) = watch::channel(initial);
        Self {
            provider,
            network,
            current,
        }
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    pub fn current(&self) -> Option<Arc<SessionContext>> {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> SessionWatch {
        self.current.subscribe()
    }

    pub async fn sign_in(&self) -> Result<Arc<SessionContext>, SessionError> {
        let account = self.provider.sign_in().await?;
        let ctx = Arc::new(SessionContext::new(account, self.network));
        self.current.send_replace(Some(ctx.clone()));
        info!(account = %ctx.account_id, network = ctx.network.network_id(), "Signed in");
        Ok(ctx)
    }

    pub async fn sign_out(&self) -> Result<(), SessionError> {
        if let Err(e) = self.provider.sign_out().await {
            warn!(error = %e, "Wallet sign-out failed");
            return Err(e);
        }
        if let Some(previous) = self.current.send_replace(None) {
            info!(account = %previous.account_id, "Signed out");
        }
        Ok(())
    }
}
