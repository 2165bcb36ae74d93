//! In-process fakes for the wallet and the KV indexer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use fastdata_shared::kv::{KvEntries, KvEntry};
use fastdata_shared::{AccountId, TxHash};

use crate::config::ClientConfig;
use crate::error::SessionError;
use crate::session::{CallRejection, FunctionCall, SessionProvider};

pub fn test_config(api_base_url: &str) -> ClientConfig {
    ClientConfig {
        api_base_url: api_base_url.to_string(),
        reconcile_delay: Duration::from_millis(300),
        http_timeout: Duration::from_secs(2),
        ..ClientConfig::default()
    }
}

#[derive(Debug, Clone)]
pub enum WalletMode {
    Succeed,
    /// Fail every call, attaching `hashes` to the rejection.
    Reject { hashes: Vec<TxHash> },
}

/// Records every call and answers according to its [`WalletMode`].
pub struct FakeWallet {
    account: AccountId,
    signed_in: Mutex<bool>,
    mode: Mutex<WalletMode>,
    calls: Mutex<Vec<FunctionCall>>,
    sent: AtomicUsize,
}

impl FakeWallet {
    fn with_state(account: &str, signed_in: bool) -> Self {
        Self {
            account: AccountId::from_trusted(account),
            signed_in: Mutex::new(signed_in),
            mode: Mutex::new(WalletMode::Succeed),
            calls: Mutex::new(Vec::new()),
            sent: AtomicUsize::new(0),
        }
    }

    pub fn signed_in(account: &str) -> Self {
        Self::with_state(account, true)
    }

    pub fn signed_out(account: &str) -> Self {
        Self::with_state(account, false)
    }

    pub fn set_mode(&self, mode: WalletMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn calls(&self) -> Vec<FunctionCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl SessionProvider for FakeWallet {
    fn account_id(&self) -> Option<AccountId> {
        let signed_in = *self.signed_in.lock().unwrap();
        signed_in.then(|| self.account.clone())
    }

    async fn sign_in(&self) -> Result<AccountId, SessionError> {
        *self.signed_in.lock().unwrap() = true;
        Ok(self.account.clone())
    }

    async fn sign_out(&self) -> Result<(), SessionError> {
        *self.signed_in.lock().unwrap() = false;
        Ok(())
    }

    async fn call_function(&self, call: FunctionCall) -> Result<TxHash, CallRejection> {
        self.calls.lock().unwrap().push(call);
        let n = self.sent.fetch_add(1, Ordering::SeqCst);
        let mode = self.mode.lock().unwrap().clone();
        match mode {
            WalletMode::Succeed => Ok(format!("tx{n}")),
            WalletMode::Reject { hashes } => {
                Err(CallRejection::new("Method __fastdata not found").with_hashes(hashes))
            }
        }
    }
}

#[derive(Default)]
struct IndexerState {
    entries: Vec<KvEntry>,
    failing: bool,
    last_query: Option<HashMap<String, String>>,
    health_checks: usize,
}

/// KV indexer serving raw rows, tombstones included.
#[derive(Clone, Default)]
pub struct FakeIndexer {
    state: Arc<Mutex<IndexerState>>,
}

impl FakeIndexer {
    pub fn put(&self, predecessor: &str, key: &str, value: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .entries
            .retain(|e| !(e.predecessor_id == predecessor && e.key == key));
        state.entries.push(KvEntry {
            predecessor_id: predecessor.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    /// Answer every request with 500.
    pub fn set_failing(&self, failing: bool) {
        self.state.lock().unwrap().failing = failing;
    }

    pub fn last_query(&self) -> Option<HashMap<String, String>> {
        self.state.lock().unwrap().last_query.clone()
    }

    pub fn health_checks(&self) -> usize {
        self.state.lock().unwrap().health_checks
    }

    fn router(self) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/v1/kv/query", get(query))
            .route("/v1/kv/reverse", get(reverse))
            .with_state(self)
    }
}

async fn health(State(indexer): State<FakeIndexer>) -> StatusCode {
    let mut state = indexer.state.lock().unwrap();
    state.health_checks += 1;
    if state.failing {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}

async fn query(
    State(indexer): State<FakeIndexer>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<KvEntries>, StatusCode> {
    let mut state = indexer.state.lock().unwrap();
    state.last_query = Some(params.clone());
    if state.failing {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let predecessor = params.get("predecessor_id").cloned().unwrap_or_default();
    let prefix = params.get("key_prefix").cloned().unwrap_or_default();
    let entries = state
        .entries
        .iter()
        .filter(|e| e.predecessor_id == predecessor && e.key.starts_with(&prefix))
        .cloned()
        .collect();
    Ok(Json(KvEntries { entries }))
}

async fn reverse(
    State(indexer): State<FakeIndexer>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<KvEntries>, StatusCode> {
    let mut state = indexer.state.lock().unwrap();
    state.last_query = Some(params.clone());
    if state.failing {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let key = params.get("key").cloned().unwrap_or_default();
    let entries = state
        .entries
        .iter()
        .filter(|e| e.key == key)
        .cloned()
        .collect();
    Ok(Json(KvEntries { entries }))
}

/// Serve `indexer` on an ephemeral port, returning its base URL.
pub async fn spawn_indexer(indexer: FakeIndexer) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, indexer.router()).await.unwrap();
    });
    format!("http://{addr}")
}

/// Base URL of a port nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
