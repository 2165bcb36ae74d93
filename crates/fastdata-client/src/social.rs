//! Follow/unfollow with optimistic local commit and delayed reconciliation.
//!
//! The following set of the signed-in account is owned by a single task.
//! Every mutation and reload is a [`SocialCommand`] handled in arrival order,
//! so two quick follows can never overwrite each other's result.
//!
//! A write is committed locally whether the wallet accepts or rejects the
//! call: `__fastdata_kv` does not exist on the contract, so wallets often
//! report failure while the indexer still picks the data up. Three seconds
//! (by default) after each write the task re-reads the indexer and replaces
//! its local view with what the indexer says.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use fastdata_shared::constants::KV_METHOD;
use fastdata_shared::kv::KvArgs;
use fastdata_shared::{AccountId, TxHash};
use fastdata_store::{Database, StoreError};

use crate::config::ClientConfig;
use crate::error::{ClientError, ValidationError};
use crate::events::{emit_event, SocialNotification};
use crate::kv_api::KvApi;
use crate::session::{FunctionCall, SessionContext, SessionProvider};

const COMMAND_CHANNEL_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Follow,
    Unfollow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// Handed to the wallet, no answer yet.
    Pending,
    Success,
}

/// Result of the latest follow/unfollow, shown until dismissed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionOutcome {
    pub kind: TxKind,
    pub account: AccountId,
    pub tx_hash: Option<TxHash>,
    pub status: OutcomeStatus,
    /// The wallet rejected the call. The change was committed anyway.
    pub degraded: bool,
    /// `<explorer>/<tx hash>` when the hash is known.
    pub explorer_url: Option<String>,
    pub at: DateTime<Utc>,
}

impl TransactionOutcome {
    fn pending(kind: TxKind, account: AccountId) -> Self {
        Self {
            kind,
            account,
            tx_hash: None,
            status: OutcomeStatus::Pending,
            degraded: false,
            explorer_url: None,
            at: Utc::now(),
        }
    }

    pub fn headline(&self) -> String {
        let account = self.account.short();
        match (self.status, self.degraded, self.kind) {
            (OutcomeStatus::Pending, _, TxKind::Follow) => format!("Following {account}..."),
            (OutcomeStatus::Pending, _, TxKind::Unfollow) => format!("Unfollowing {account}..."),
            (OutcomeStatus::Success, true, _) => {
                "Transaction sent (may show as failed in wallet)".to_string()
            }
            (OutcomeStatus::Success, false, TxKind::Follow) => format!("Followed {account}"),
            (OutcomeStatus::Success, false, TxKind::Unfollow) => format!("Unfollowed {account}"),
        }
    }

    pub fn detail(&self) -> &'static str {
        if self.degraded {
            "KV transactions often appear as failed but the data is still being indexed."
        } else {
            "Data is being indexed (~2-3 seconds)"
        }
    }
}

fn explorer_link(explorer_base: &str, tx_hash: &str) -> String {
    format!("{}/{}", explorer_base.trim_end_matches('/'), tx_hash)
}

/// What a social view renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocialSnapshot {
    pub account: AccountId,
    pub following: Vec<AccountId>,
    pub followers: Vec<AccountId>,
    pub api_available: bool,
    /// Write time of the mirrored list `following` was last loaded from.
    /// `None` once the indexer answered.
    pub mirrored_at: Option<DateTime<Utc>>,
    pub last_outcome: Option<TransactionOutcome>,
}

type ValidationReply = oneshot::Sender<Result<TransactionOutcome, ValidationError>>;

/// Commands sent *to* the social graph task.
#[derive(Debug)]
pub enum SocialCommand {
    Follow { target: String, reply: ValidationReply },
    Unfollow { target: String, reply: ValidationReply },
    /// Re-read the indexer (or the mirror). Posted by the reconcile timer
    /// without a reply channel.
    Reload {
        reply: Option<oneshot::Sender<SocialSnapshot>>,
    },
    Snapshot(oneshot::Sender<SocialSnapshot>),
    DismissOutcome,
    Shutdown,
}

/// Cloneable handle to a running social graph task.
#[derive(Debug, Clone)]
pub struct SocialHandle {
    account: AccountId,
    cmd_tx: mpsc::Sender<SocialCommand>,
}

impl SocialHandle {
    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub async fn follow(&self, target: &str) -> Result<TransactionOutcome, ClientError> {
        let (reply, rx) = oneshot::channel();
        self.send(SocialCommand::Follow {
            target: target.to_string(),
            reply,
        })
        .await?;
        Ok(rx.await.map_err(|_| ClientError::ActorGone)??)
    }

    pub async fn unfollow(&self, target: &str) -> Result<TransactionOutcome, ClientError> {
        let (reply, rx) = oneshot::channel();
        self.send(SocialCommand::Unfollow {
            target: target.to_string(),
            reply,
        })
        .await?;
        Ok(rx.await.map_err(|_| ClientError::ActorGone)??)
    }

    pub async fn reload(&self) -> Result<SocialSnapshot, ClientError> {
        let (reply, rx) = oneshot::channel();
        self.send(SocialCommand::Reload { reply: Some(reply) }).await?;
        rx.await.map_err(|_| ClientError::ActorGone)
    }

    pub async fn snapshot(&self) -> Result<SocialSnapshot, ClientError> {
        let (reply, rx) = oneshot::channel();
        self.send(SocialCommand::Snapshot(reply)).await?;
        rx.await.map_err(|_| ClientError::ActorGone)
    }

    pub async fn dismiss_outcome(&self) -> Result<(), ClientError> {
        self.send(SocialCommand::DismissOutcome).await
    }

    pub async fn shutdown(&self) {
        let _ = self.cmd_tx.send(SocialCommand::Shutdown).await;
    }

    async fn send(&self, cmd: SocialCommand) -> Result<(), ClientError> {
        self.cmd_tx.send(cmd).await.map_err(|_| ClientError::ActorGone)
    }
}

/// Spawn the social graph task for the signed-in account.
///
/// The task loads the following/followers lists before serving commands.
/// It stops on [`SocialCommand::Shutdown`] or once every handle is dropped.
pub fn spawn_social_graph<P: SessionProvider>(
    ctx: Arc<SessionContext>,
    provider: Arc<P>,
    api: KvApi,
    db: Arc<Mutex<Database>>,
    config: &ClientConfig,
) -> (SocialHandle, mpsc::UnboundedReceiver<SocialNotification>) {
    let (cmd_tx, mut cmd_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
    let (notif_tx, notif_rx) = mpsc::unbounded_channel();

    let mut graph = SocialGraph {
        ctx,
        provider,
        api,
        db,
        kv_contract_id: config.kv_contract_id.clone(),
        kv_gas: config.kv_gas,
        explorer_url: config.explorer_url.clone(),
        reconcile_delay: config.reconcile_delay,
        following: Vec::new(),
        followers: Vec::new(),
        api_available: true,
        mirrored_at: None,
        last_outcome: None,
        notif_tx,
        reconcile_tx: cmd_tx.downgrade(),
    };
    let handle = SocialHandle {
        account: graph.ctx.account_id.clone(),
        cmd_tx,
    };

    tokio::spawn(async move {
        info!(account = %graph.ctx.account_id, "Social graph task started");
        graph.load().await;

        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                SocialCommand::Follow { target, reply } => {
                    let result = graph.follow(&target).await;
                    let _ = reply.send(result);
                }
                SocialCommand::Unfollow { target, reply } => {
                    let result = graph.unfollow(&target).await;
                    let _ = reply.send(result);
                }
                SocialCommand::Reload { reply } => {
                    graph.load().await;
                    if let Some(reply) = reply {
                        let _ = reply.send(graph.snapshot());
                    }
                }
                SocialCommand::Snapshot(reply) => {
                    let _ = reply.send(graph.snapshot());
                }
                SocialCommand::DismissOutcome => {
                    graph.last_outcome = None;
                }
                SocialCommand::Shutdown => {
                    info!(account = %graph.ctx.account_id, "Social graph task shutting down");
                    break;
                }
            }
        }

        debug!(account = %graph.ctx.account_id, "Social graph task ended");
    });

    (handle, notif_rx)
}

struct SocialGraph<P> {
    ctx: Arc<SessionContext>,
    provider: Arc<P>,
    api: KvApi,
    db: Arc<Mutex<Database>>,
    kv_contract_id: String,
    kv_gas: u64,
    explorer_url: String,
    reconcile_delay: Duration,
    following: Vec<AccountId>,
    followers: Vec<AccountId>,
    api_available: bool,
    mirrored_at: Option<DateTime<Utc>>,
    last_outcome: Option<TransactionOutcome>,
    notif_tx: mpsc::UnboundedSender<SocialNotification>,
    /// Weak so a pending reconcile never keeps the task alive.
    reconcile_tx: mpsc::WeakSender<SocialCommand>,
}

impl<P: SessionProvider> SocialGraph<P> {
    async fn follow(&mut self, raw: &str) -> Result<TransactionOutcome, ValidationError> {
        let target = self.validate(raw, TxKind::Follow)?;
        let args = KvArgs::follow(&target);
        Ok(self.submit(TxKind::Follow, target, args).await)
    }

    async fn unfollow(&mut self, raw: &str) -> Result<TransactionOutcome, ValidationError> {
        let target = self.validate(raw, TxKind::Unfollow)?;
        let args = KvArgs::unfollow(&target);
        Ok(self.submit(TxKind::Unfollow, target, args).await)
    }

    fn validate(&self, raw: &str, kind: TxKind) -> Result<AccountId, ValidationError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ValidationError::Empty);
        }
        // Followees read back from the indexer were never parsed; they must
        // stay removable even when they fail the format check.
        let known = match kind {
            TxKind::Unfollow => self.following.iter().find(|a| a.as_str() == raw).cloned(),
            TxKind::Follow => None,
        };
        let target = match known {
            Some(target) => target,
            None => AccountId::parse(raw).map_err(ValidationError::InvalidAccount)?,
        };
        if target == self.ctx.account_id {
            return Err(ValidationError::SelfTarget);
        }
        if kind == TxKind::Follow && self.following.contains(&target) {
            return Err(ValidationError::AlreadyFollowing(target));
        }
        Ok(target)
    }

    async fn submit(
        &mut self,
        kind: TxKind,
        target: AccountId,
        args: KvArgs,
    ) -> TransactionOutcome {
        let pending = TransactionOutcome::pending(kind, target.clone());
        self.last_outcome = Some(pending.clone());
        emit_event(&self.notif_tx, SocialNotification::Outcome(pending));

        let call = FunctionCall::json(
            &self.kv_contract_id,
            KV_METHOD,
            args.to_json(),
            self.kv_gas,
        );
        info!(
            account = %self.ctx.account_id,
            target = %target,
            kind = ?kind,
            contract = %self.kv_contract_id,
            "Submitting KV write"
        );

        let (tx_hash, degraded) = match self.provider.call_function(call).await {
            Ok(hash) => {
                debug!(tx = %hash, "KV write accepted by wallet");
                (Some(hash), false)
            }
            Err(rejection) => {
                warn!(
                    target = %target,
                    kind = ?kind,
                    error = %rejection.message,
                    tx = ?rejection.recovered_tx_hash(),
                    "Wallet rejected KV write, committing locally anyway"
                );
                (rejection.recovered_tx_hash(), true)
            }
        };

        match kind {
            TxKind::Follow => {
                if !self.following.contains(&target) {
                    self.following.push(target.clone());
                }
            }
            TxKind::Unfollow => self.following.retain(|a| a != &target),
        }
        self.persist_following(&self.following);

        let explorer_url = tx_hash
            .as_deref()
            .map(|hash| explorer_link(&self.explorer_url, hash));
        let outcome = TransactionOutcome {
            kind,
            account: target,
            tx_hash,
            status: OutcomeStatus::Success,
            degraded,
            explorer_url,
            at: Utc::now(),
        };
        self.last_outcome = Some(outcome.clone());
        emit_event(&self.notif_tx, SocialNotification::Outcome(outcome.clone()));

        self.schedule_reconcile();
        outcome
    }

    /// Health check, then indexer, else mirror. Replaces the local view.
    async fn load(&mut self) {
        let account = self.ctx.account_id.clone();
        let available = self.api.check_health().await;
        if available != self.api_available {
            emit_event(&self.notif_tx, SocialNotification::ApiAvailability { available });
        }
        self.api_available = available;

        if available {
            let following = self.api.fetch_following(&account).await;
            let followers = self.api.fetch_followers(&account).await;

            if let Some(following) = following {
                self.persist_following(&following);
                self.following = following;
                self.mirrored_at = None;
            }
            if let Some(followers) = followers {
                self.followers = followers;
            }
        } else {
            if let Some((stored, mirrored_at)) = self.read_mirror() {
                self.following = stored;
                self.mirrored_at = mirrored_at;
            }
            self.followers.clear();
        }

        debug!(
            account = %account,
            api_available = available,
            following = self.following.len(),
            followers = self.followers.len(),
            "Social graph loaded"
        );
        emit_event(&self.notif_tx, SocialNotification::Reloaded(self.snapshot()));
    }

    fn schedule_reconcile(&self) {
        let weak = self.reconcile_tx.clone();
        let delay = self.reconcile_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(tx) = weak.upgrade() {
                let _ = tx.send(SocialCommand::Reload { reply: None }).await;
            }
        });
    }

    fn snapshot(&self) -> SocialSnapshot {
        SocialSnapshot {
            account: self.ctx.account_id.clone(),
            following: self.following.clone(),
            followers: self.followers.clone(),
            api_available: self.api_available,
            mirrored_at: self.mirrored_at,
            last_outcome: self.last_outcome.clone(),
        }
    }

    fn persist_following(&self, following: &[AccountId]) {
        let result = match self.db.lock() {
            Ok(db) => db.save_following(&self.ctx.account_id, following),
            Err(e) => {
                error!(error = %e, "Mirror lock poisoned");
                return;
            }
        };
        if let Err(e) = result {
            warn!(account = %self.ctx.account_id, error = %e, "Failed to mirror following list");
        }
    }

    /// `None` when nothing was mirrored yet. A corrupt value reads as empty
    /// with no write time.
    fn read_mirror(&self) -> Option<(Vec<AccountId>, Option<DateTime<Utc>>)> {
        let db = match self.db.lock() {
            Ok(db) => db,
            Err(e) => {
                error!(error = %e, "Mirror lock poisoned");
                return None;
            }
        };
        match db.load_following(&self.ctx.account_id) {
            Ok(stored) => stored.map(|m| {
                debug!(
                    account = %self.ctx.account_id,
                    mirrored_at = %m.updated_at,
                    "Using mirrored following list"
                );
                (m.accounts, Some(m.updated_at))
            }),
            Err(StoreError::Json(e)) => {
                warn!(
                    account = %self.ctx.account_id,
                    error = %e,
                    "Corrupt mirrored following list"
                );
                Some((Vec::new(), None))
            }
            Err(e) => {
                warn!(account = %self.ctx.account_id, error = %e, "Failed to read mirror");
                None
            }
        }
    }
}
