//! KV social graph layout.
//!
//! A follow edge from `follower` to `followee` is the key
//! `graph/follow/<followee>` written by `follower`. The value `""` means the
//! edge exists, `"null"` is a tombstone.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{EDGE_PRESENT, FOLLOW_KEY_PREFIX, MAX_KV_KEYS_PER_TX, TOMBSTONE};
use crate::error::KvError;
use crate::types::AccountId;

pub fn follow_key(followee: &AccountId) -> String {
    format!("{FOLLOW_KEY_PREFIX}{followee}")
}

/// `graph/follow/alice.near` -> `alice.near`
pub fn followee_from_key(key: &str) -> Option<AccountId> {
    key.strip_prefix(FOLLOW_KEY_PREFIX)
        .filter(|rest| !rest.is_empty())
        .map(AccountId::from_trusted)
}

/// JSON argument of a `__fastdata_kv` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KvArgs(BTreeMap<String, String>);

impl KvArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<(), KvError> {
        let key = key.into();
        if !self.0.contains_key(&key) && self.0.len() >= MAX_KV_KEYS_PER_TX {
            return Err(KvError::TooManyKeys {
                max: MAX_KV_KEYS_PER_TX,
            });
        }
        self.0.insert(key, value.into());
        Ok(())
    }

    pub fn follow(target: &AccountId) -> Self {
        let mut args = Self::new();
        args.0.insert(follow_key(target), EDGE_PRESENT.to_string());
        args
    }

    pub fn unfollow(target: &AccountId) -> Self {
        let mut args = Self::new();
        args.0.insert(follow_key(target), TOMBSTONE.to_string());
        args
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect(),
        )
    }
}

/// One row returned by the indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvEntry {
    pub predecessor_id: String,
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl KvEntry {
    pub fn is_tombstone(&self) -> bool {
        self.value == TOMBSTONE
    }
}

/// Body of `/v1/kv/query` and `/v1/kv/reverse`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvEntries {
    #[serde(default)]
    pub entries: Vec<KvEntry>,
}
