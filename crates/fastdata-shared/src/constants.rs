/// Application name
pub const APP_NAME: &str = "FastData";

/// Contract receiving FastFS uploads (mainnet)
pub const FASTFS_CONTRACT_ID: &str = "fastfs.near";

/// Contract receiving KV writes (mainnet)
pub const KV_CONTRACT_ID: &str = "social.near";

/// Method carrying a Borsh-encoded FastFS payload
pub const FASTFS_METHOD: &str = "__fastdata_fastfs";

/// Method carrying a plain JSON key/value map
pub const KV_METHOD: &str = "__fastdata_kv";

/// Gas attached to FastFS calls. The method is never executed; the indexer
/// reads the payload from the transaction.
pub const FASTFS_GAS: u64 = 1;

/// Gas attached to KV calls (10 Tgas)
pub const KV_GAS: u64 = 10_000_000_000_000;

/// Maximum number of keys in a single `__fastdata_kv` call
pub const MAX_KV_KEYS_PER_TX: usize = 256;

/// Domain serving uploaded files as `https://<account>.<domain>/<contract>/<path>`
pub const FASTFS_DOMAIN: &str = "fastfs.io";

/// Default KV indexer API (local development server)
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

/// Transaction explorer base URL
pub const EXPLORER_URL: &str = "https://nearblocks.io/txns";

/// Key prefix of follow edges: `graph/follow/<followee>`
pub const FOLLOW_KEY_PREFIX: &str = "graph/follow/";

/// Value marking an existing edge
pub const EDGE_PRESENT: &str = "";

/// Value marking a removed edge. The key is never deleted.
pub const TOMBSTONE: &str = "null";

/// Delay before re-reading the indexer after a write, in milliseconds
pub const RECONCILE_DELAY_MS: u64 = 3_000;

/// Maximum number of files per upload batch
pub const MAX_UPLOAD_FILES: usize = 10;

/// Maximum size of a single uploaded file in bytes
pub const MAX_UPLOAD_FILE_SIZE: usize = 1_400_000;

/// Length of an implicit (hex) account id
pub const IMPLICIT_ACCOUNT_LEN: usize = 64;

/// Bounds on the name part of a named account, before the network suffix
pub const MIN_ACCOUNT_NAME_LEN: usize = 2;
pub const MAX_ACCOUNT_NAME_LEN: usize = 64;
