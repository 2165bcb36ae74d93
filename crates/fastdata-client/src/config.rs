//! Client configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the client can start with zero
//! configuration against a local KV API server.

use std::path::PathBuf;
use std::time::Duration;

use fastdata_shared::constants::{
    DEFAULT_API_BASE_URL, EXPLORER_URL, FASTFS_DOMAIN, FASTFS_GAS, KV_GAS, MAX_UPLOAD_FILES,
    MAX_UPLOAD_FILE_SIZE, RECONCILE_DELAY_MS,
};
use fastdata_shared::Network;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Network the wallet is signed into. Picks the default contracts.
    /// Env: `FASTDATA_NETWORK` (mainnet/testnet)
    /// Default: `mainnet`
    pub network: Network,

    /// Base URL of the KV indexer API.
    /// Env: `FASTDATA_API_URL`
    /// Default: `http://localhost:3000`
    pub api_base_url: String,

    /// Contract receiving `__fastdata_fastfs` calls.
    /// Env: `FASTFS_CONTRACT_ID`
    /// Default: `fastfs.near` / `fastfs.testnet`
    pub fastfs_contract_id: String,

    /// Contract receiving `__fastdata_kv` calls and scoping indexer queries.
    /// Env: `KV_CONTRACT_ID`
    /// Default: `social.near` / `social.testnet`
    pub kv_contract_id: String,

    /// Gas attached to KV writes.
    /// Env: `KV_GAS`
    pub kv_gas: u64,

    /// Gas attached to FastFS uploads.
    /// Env: `FASTFS_GAS`
    pub fastfs_gas: u64,

    /// Domain serving uploaded files.
    /// Env: `FASTFS_DOMAIN`
    /// Default: `fastfs.io`
    pub fastfs_domain: String,

    /// Transaction explorer base URL.
    /// Env: `EXPLORER_URL`
    pub explorer_url: String,

    /// Delay between a write and the reconciling re-read of the indexer.
    /// Env: `RECONCILE_DELAY_MS`
    /// Default: 3000
    pub reconcile_delay: Duration,

    /// Timeout of each indexer request.
    /// Env: `HTTP_TIMEOUT_SECS`
    /// Default: 10
    pub http_timeout: Duration,

    /// Maximum number of files per upload.
    /// Env: `MAX_UPLOAD_FILES`
    pub max_upload_files: usize,

    /// Maximum size of one uploaded file in bytes.
    /// Env: `MAX_UPLOAD_FILE_SIZE`
    pub max_upload_file_size: usize,

    /// Path of the local mirror database. `None` uses the platform data dir.
    /// Env: `FASTDATA_DB_PATH`
    pub db_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let network = Network::default();
        Self {
            network,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            fastfs_contract_id: network.fastfs_contract_id().to_string(),
            kv_contract_id: network.kv_contract_id().to_string(),
            kv_gas: KV_GAS,
            fastfs_gas: FASTFS_GAS,
            fastfs_domain: FASTFS_DOMAIN.to_string(),
            explorer_url: EXPLORER_URL.to_string(),
            reconcile_delay: Duration::from_millis(RECONCILE_DELAY_MS),
            http_timeout: Duration::from_secs(10),
            max_upload_files: MAX_UPLOAD_FILES,
            max_upload_file_size: MAX_UPLOAD_FILE_SIZE,
            db_path: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup("FASTDATA_NETWORK") {
            match val.parse::<Network>() {
                Ok(network) => {
                    config.network = network;
                    config.fastfs_contract_id = network.fastfs_contract_id().to_string();
                    config.kv_contract_id = network.kv_contract_id().to_string();
                }
                Err(e) => tracing::warn!(error = %e, "Invalid FASTDATA_NETWORK, using default"),
            }
        }

        if let Some(url) = lookup("FASTDATA_API_URL") {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(id) = lookup("FASTFS_CONTRACT_ID") {
            config.fastfs_contract_id = id;
        }

        if let Some(id) = lookup("KV_CONTRACT_ID") {
            config.kv_contract_id = id;
        }

        if let Some(domain) = lookup("FASTFS_DOMAIN") {
            config.fastfs_domain = domain;
        }

        if let Some(url) = lookup("EXPLORER_URL") {
            config.explorer_url = url.trim_end_matches('/').to_string();
        }

        if let Some(gas) = parse_var(&lookup, "KV_GAS") {
            config.kv_gas = gas;
        }

        if let Some(gas) = parse_var(&lookup, "FASTFS_GAS") {
            config.fastfs_gas = gas;
        }

        if let Some(ms) = parse_var(&lookup, "RECONCILE_DELAY_MS") {
            config.reconcile_delay = Duration::from_millis(ms);
        }

        if let Some(secs) = parse_var(&lookup, "HTTP_TIMEOUT_SECS") {
            config.http_timeout = Duration::from_secs(secs);
        }

        if let Some(n) = parse_var(&lookup, "MAX_UPLOAD_FILES") {
            config.max_upload_files = n;
        }

        if let Some(n) = parse_var(&lookup, "MAX_UPLOAD_FILE_SIZE") {
            config.max_upload_file_size = n;
        }

        if let Some(path) = lookup("FASTDATA_DB_PATH") {
            if !path.is_empty() {
                config.db_path = Some(PathBuf::from(path));
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "Invalid value, using default");
            None
        }
    }
}
