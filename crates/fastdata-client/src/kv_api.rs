//! Read-only client of the KV indexer.
//!
//! Every failure (transport, non-2xx status, undecodable body) is logged and
//! collapsed to `None` / `false`. Callers fall back to the local mirror.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use fastdata_shared::constants::FOLLOW_KEY_PREFIX;
use fastdata_shared::kv::{follow_key, followee_from_key, KvEntries};
use fastdata_shared::AccountId;

use crate::config::ClientConfig;
use crate::error::ClientError;

#[derive(Debug, Clone)]
pub struct KvApi {
    http: Client,
    base_url: String,
    contract_id: String,
}

impl KvApi {
    pub fn new(
        base_url: impl Into<String>,
        contract_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            contract_id: contract_id.into(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::new(
            &config.api_base_url,
            &config.kv_contract_id,
            config.http_timeout,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Accounts `account` follows, in indexer order.
    pub async fn fetch_following(&self, account: &AccountId) -> Option<Vec<AccountId>> {
        let body: KvEntries = self
            .get_json(
                "/v1/kv/query",
                &[
                    ("predecessor_id", account.as_str()),
                    ("current_account_id", self.contract_id.as_str()),
                    ("key_prefix", FOLLOW_KEY_PREFIX),
                    ("exclude_null", "true"),
                ],
            )
            .await?;

        let following: Vec<AccountId> = body
            .entries
            .iter()
            .filter(|entry| !entry.is_tombstone())
            .filter(|entry| {
                entry.predecessor_id.is_empty() || entry.predecessor_id == account.as_str()
            })
            .filter_map(|entry| followee_from_key(&entry.key))
            .collect();

        debug!(account = %account, count = following.len(), "Fetched following");
        Some(following)
    }

    /// Accounts following `account`.
    pub async fn fetch_followers(&self, account: &AccountId) -> Option<Vec<AccountId>> {
        let key = follow_key(account);
        let body: KvEntries = self
            .get_json(
                "/v1/kv/reverse",
                &[
                    ("current_account_id", self.contract_id.as_str()),
                    ("key", key.as_str()),
                    ("exclude_null", "true"),
                ],
            )
            .await?;

        let followers: Vec<AccountId> = body
            .entries
            .into_iter()
            .filter(|entry| !entry.is_tombstone() && !entry.predecessor_id.is_empty())
            .map(|entry| AccountId::from_trusted(entry.predecessor_id))
            .collect();

        debug!(account = %account, count = followers.len(), "Fetched followers");
        Some(followers)
    }

    pub async fn check_health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.http.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                warn!(url = %url, status = %resp.status(), "Indexer health check failed");
                false
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Indexer unreachable");
                false
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Option<T> {
        let url = format!("{}{}", self.base_url, path);
        let resp = match self.http.get(&url).query(query).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(url = %url, error = %e, "Indexer request failed");
                return None;
            }
        };

        let status = resp.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "Indexer returned an error status");
            return None;
        }

        match resp.json::<T>().await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(url = %url, error = %e, "Undecodable indexer response");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{closed_port_url, spawn_indexer, FakeIndexer};

    fn api(base: &str) -> KvApi {
        KvApi::new(base, "social.near", Duration::from_secs(2)).unwrap()
    }

    fn acct(s: &str) -> AccountId {
        AccountId::from_trusted(s)
    }

    #[tokio::test]
    async fn test_fetch_following_strips_prefix_and_skips_tombstones() {
        let indexer = FakeIndexer::default();
        indexer.put("james.near", "graph/follow/alice.near", "");
        indexer.put("james.near", "graph/follow/bob.near", "null");
        indexer.put("james.near", "graph/follow/carol.near", "");
        let base = spawn_indexer(indexer.clone()).await;

        let following = api(&base).fetch_following(&acct("james.near")).await.unwrap();
        assert_eq!(following, vec![acct("alice.near"), acct("carol.near")]);

        let query = indexer.last_query().unwrap();
        assert_eq!(query.get("predecessor_id").map(String::as_str), Some("james.near"));
        assert_eq!(query.get("current_account_id").map(String::as_str), Some("social.near"));
        assert_eq!(query.get("key_prefix").map(String::as_str), Some("graph/follow/"));
        assert_eq!(query.get("exclude_null").map(String::as_str), Some("true"));
    }

    #[tokio::test]
    async fn test_fetch_followers_uses_predecessors() {
        let indexer = FakeIndexer::default();
        indexer.put("kate.near", "graph/follow/alice.near", "");
        indexer.put("bob.near", "graph/follow/alice.near", "");
        indexer.put("dan.near", "graph/follow/alice.near", "null");
        indexer.put("kate.near", "graph/follow/bob.near", "");
        let base = spawn_indexer(indexer).await;

        let mut followers = api(&base).fetch_followers(&acct("alice.near")).await.unwrap();
        followers.sort();
        assert_eq!(followers, vec![acct("bob.near"), acct("kate.near")]);
    }

    #[tokio::test]
    async fn test_unreachable_indexer_yields_none() {
        let api = api(&closed_port_url().await);
        assert_eq!(api.fetch_following(&acct("james.near")).await, None);
        assert_eq!(api.fetch_followers(&acct("james.near")).await, None);
        assert!(!api.check_health().await);
    }

    #[tokio::test]
    async fn test_error_status_yields_none() {
        let indexer = FakeIndexer::default();
        indexer.set_failing(true);
        let base = spawn_indexer(indexer).await;
        let api = api(&base);

        assert_eq!(api.fetch_following(&acct("james.near")).await, None);
        assert_eq!(api.fetch_followers(&acct("james.near")).await, None);
        assert!(!api.check_health().await);
    }

    #[tokio::test]
    async fn test_healthy_indexer() {
        let base = spawn_indexer(FakeIndexer::default()).await;
        let api = api(&format!("{base}/"));
        assert_eq!(api.base_url(), base);
        assert!(api.check_health().await);
        assert_eq!(api.fetch_following(&acct("james.near")).await, Some(vec![]));
    }
}
