//! studyhub-portal — application core of the StudyHub student portal.
//!
//! Wires the session store, the auth and chat HTTP clients and the forum
//! state behind a single [`Portal`] value. The `commands` module is the
//! surface a view layer calls into.

pub mod auth_client;
pub mod chat;
pub mod commands;
pub mod config;
pub mod error;
pub mod forum;
pub mod telemetry;

use std::sync::{Arc, Mutex, MutexGuard};

use studyhub_session::storage::{
    CookieJar, CookieSlot, KeychainSlot, MemorySlot, SessionSlot, SqliteSlot,
};
use studyhub_session::{HistoryNavigator, Navigator, SessionStatus, SessionStore};
use studyhub_shared::error::PortalError;
use tracing::info;

use crate::auth_client::AuthClient;
use crate::chat::{ChatAssistant, ChatPanel, CompletionClient};
use crate::config::{PortalConfig, SessionConfig, StorageBackend};
use crate::error::AppError;
use crate::forum::DiscussionBoard;

/// Open the durable slot named by the session config.
///
/// The cookie backend stores into `jar`, which the caller keeps so the
/// `Cookie`/`Set-Cookie` exchange with the browser can happen.
pub fn build_slot(
    config: &SessionConfig,
    jar: &Arc<CookieJar>,
) -> Result<Arc<dyn SessionSlot>, AppError> {
    let name = config.cookie_name.clone();
    let slot: Arc<dyn SessionSlot> = match config.storage {
        StorageBackend::Memory => Arc::new(MemorySlot::new()),
        StorageBackend::Cookie => Arc::new(CookieSlot::new(jar.clone(), name)),
        StorageBackend::Sqlite => Arc::new(SqliteSlot::open(&config.sqlite_path, name)?),
        StorageBackend::Keyring => Arc::new(KeychainSlot::new(name)),
    };
    Ok(slot)
}

pub struct Portal {
    config: PortalConfig,
    session: SessionStore,
    auth: AuthClient,
    chat: ChatPanel,
    forum: Mutex<DiscussionBoard>,
    cookie_jar: Option<Arc<CookieJar>>,
}

impl Portal {
    pub fn new(
        config: PortalConfig,
        slot: Arc<dyn SessionSlot>,
        navigator: Arc<dyn Navigator>,
        assistant: Arc<dyn ChatAssistant>,
    ) -> Result<Self, AppError> {
        let max_age = config.session_max_age().ok_or_else(|| {
            PortalError::Validation(format!(
                "session.max_age_days must be a positive number of days, got {}",
                config.session.max_age_days
            ))
        })?;
        let session = SessionStore::new(slot, navigator).with_max_age(max_age);
        let auth = AuthClient::from_config(&config)?;
        Ok(Self {
            config,
            session,
            auth,
            chat: ChatPanel::new(assistant),
            forum: Mutex::new(DiscussionBoard::new()),
            cookie_jar: None,
        })
    }

    /// Build every collaborator from configuration alone, with an empty
    /// cookie jar.
    pub fn from_config(config: PortalConfig) -> Result<Self, AppError> {
        Self::from_config_with_cookies(config, "")
    }

    /// Like [`Self::from_config`], seeding the cookie jar from the
    /// browser's `Cookie:` request header so a reload restores the session.
    pub fn from_config_with_cookies(
        config: PortalConfig,
        cookie_header: &str,
    ) -> Result<Self, AppError> {
        let jar = Arc::new(CookieJar::from_header(cookie_header));
        let slot = build_slot(&config.session, &jar)?;
        let navigator = Arc::new(HistoryNavigator::new());
        let assistant = Arc::new(CompletionClient::from_config(&config)?);
        let mut portal = Self::new(config, slot, navigator, assistant)?;
        portal.cookie_jar = Some(jar);
        Ok(portal)
    }

    /// Load `.env`, `portal.toml` and env overrides, install tracing, build.
    pub fn from_env() -> Result<Self, AppError> {
        let config = PortalConfig::load()
            .map_err(|e| AppError::new(format!("failed to load config: {e}")))?;
        telemetry::init_tracing(&config.log_level);
        info!(
            api_base_url = %config.api_base_url,
            storage = ?config.session.storage,
            "portal configured"
        );
        Self::from_config(config)
    }

    /// Restore any stored session. Must run before guard decisions are taken.
    pub fn start(&self) -> SessionStatus {
        self.session.initialize()
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    pub fn chat(&self) -> &ChatPanel {
        &self.chat
    }

    /// Jar behind the cookie backend. `None` when the portal was built with
    /// [`Self::new`]. Drain [`CookieJar::take_set_cookie_headers`] after each
    /// command and forward the headers to the browser.
    pub fn cookie_jar(&self) -> Option<&Arc<CookieJar>> {
        self.cookie_jar.as_ref()
    }

    pub fn forum(&self) -> MutexGuard<'_, DiscussionBoard> {
        self.forum.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Tear down the portal. Session subscribers observe a closed channel.
    pub fn shutdown(self) {
        info!("portal shutting down");
        drop(self);
    }
}
