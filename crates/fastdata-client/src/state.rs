//! Client state owned by the embedding application.
//!
//! [`ClientState`] owns the session, the mirror database and the social
//! graph task of the signed-in account. Signing in or out replaces the task:
//! a task never outlives the session it was spawned for.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::info;

use fastdata_store::Database;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::events::SocialNotification;
use crate::kv_api::KvApi;
use crate::session::{Session, SessionContext, SessionProvider};
use crate::social::{spawn_social_graph, SocialHandle};
use crate::upload::Uploader;

pub struct ClientState<P> {
    config: ClientConfig,
    session: Session<P>,
    api: KvApi,
    database: Arc<Mutex<Database>>,
    social: Option<SocialHandle>,
    notifications: Option<mpsc::UnboundedReceiver<SocialNotification>>,
}

impl<P: SessionProvider> ClientState<P> {
    /// Open the mirror at `config.db_path` (or the platform data dir).
    pub fn new(provider: Arc<P>, config: ClientConfig) -> Result<Self, ClientError> {
        let database = match &config.db_path {
            Some(path) => Database::open_at(path)?,
            None => Database::new()?,
        };
        Self::with_database(provider, config, database)
    }

    /// Must be called inside a Tokio runtime if the wallet is already
    /// signed in: the social graph task is spawned right away.
    pub fn with_database(
        provider: Arc<P>,
        config: ClientConfig,
        database: Database,
    ) -> Result<Self, ClientError> {
        let api = KvApi::from_config(&config)?;
        let session = Session::new(provider, config.network);
        let mut state = Self {
            config,
            session,
            api,
            database: Arc::new(Mutex::new(database)),
            social: None,
            notifications: None,
        };
        if let Some(ctx) = state.session.current() {
            state.start_social(ctx);
        }
        Ok(state)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Session<P> {
        &self.session
    }

    pub fn api(&self) -> &KvApi {
        &self.api
    }

    pub fn database(&self) -> &Arc<Mutex<Database>> {
        &self.database
    }

    pub async fn sign_in(&mut self) -> Result<Arc<SessionContext>, ClientError> {
        let ctx = self.session.sign_in().await?;
        self.stop_social().await;
        self.start_social(ctx.clone());
        Ok(ctx)
    }

    pub async fn sign_out(&mut self) -> Result<(), ClientError> {
        self.session.sign_out().await?;
        self.stop_social().await;
        Ok(())
    }

    pub fn social(&self) -> Result<&SocialHandle, ClientError> {
        self.social.as_ref().ok_or(ClientError::NotSignedIn)
    }

    /// Notifications of the current social graph task. Each task's receiver
    /// can be taken once.
    pub fn take_social_notifications(
        &mut self,
    ) -> Option<mpsc::UnboundedReceiver<SocialNotification>> {
        self.notifications.take()
    }

    pub fn uploader(&self) -> Result<Uploader<P>, ClientError> {
        let ctx = self.session.current().ok_or(ClientError::NotSignedIn)?;
        Ok(Uploader::new(
            &ctx,
            self.session.provider().clone(),
            &self.config,
        ))
    }

    fn start_social(&mut self, ctx: Arc<SessionContext>) {
        let (handle, notifications) = spawn_social_graph(
            ctx,
            self.session.provider().clone(),
            self.api.clone(),
            self.database.clone(),
            &self.config,
        );
        self.social = Some(handle);
        self.notifications = Some(notifications);
    }

    async fn stop_social(&mut self) {
        self.notifications = None;
        if let Some(handle) = self.social.take() {
            info!(account = %handle.account(), "Stopping social graph task");
            handle.shutdown().await;
        }
    }
}
