//! Records persisted in the local database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fastdata_shared::AccountId;

/// One row of the local mirror.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MirrorEntry {
    /// Account-scoped key, e.g. `following_alice.near`.
    pub key: String,
    /// JSON-encoded value.
    pub value: String,
    /// When the value was last written locally.
    pub updated_at: DateTime<Utc>,
}

/// Following list read back from the mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirroredFollowing {
    pub accounts: Vec<AccountId>,
    pub updated_at: DateTime<Utc>,
}
