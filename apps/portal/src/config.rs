use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;
use studyhub_shared::constants::{
    DEFAULT_CHAT_API_URL, DEFAULT_CHAT_MODEL, SESSION_COOKIE_NAME, SESSION_MAX_AGE_DAYS,
};

/// Portal configuration loaded from portal.toml with env var overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    /// Base URL of the authentication service. Default: "http://localhost:5000"
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Tracing log level. Default: "info"
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Whole-request timeout for outbound HTTP. Default: 15
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Default: 5
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Where the signed-in profile is persisted between reloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    Cookie,
    Sqlite,
    Keyring,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "cookie" => Ok(Self::Cookie),
            "sqlite" => Ok(Self::Sqlite),
            "keyring" => Ok(Self::Keyring),
            other => Err(format!("unknown session storage: {other}")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Name of the durable slot. Default: "user"
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Default: 7
    #[serde(default = "default_max_age_days")]
    pub max_age_days: i64,
    #[serde(default)]
    pub storage: StorageBackend,
    /// Only read when `storage = "sqlite"`.
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            max_age_days: default_max_age_days(),
            storage: StorageBackend::default(),
            sqlite_path: default_sqlite_path(),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_chat_api_url")]
    pub api_url: String,
    #[serde(default = "default_chat_model")]
    pub model: String,
    /// Bearer key for the completion service. Never logged.
    #[serde(default)]
    pub api_key: String,
}

impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field(
                "api_key",
                &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" },
            )
            .finish()
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: default_chat_api_url(),
            model: default_chat_model(),
            api_key: String::new(),
        }
    }
}

fn default_api_base_url() -> String {
    "http://localhost:5000".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_request_timeout_secs() -> u64 {
    15
}
fn default_connect_timeout_secs() -> u64 {
    5
}
fn default_cookie_name() -> String {
    SESSION_COOKIE_NAME.to_string()
}
fn default_max_age_days() -> i64 {
    SESSION_MAX_AGE_DAYS
}
fn default_sqlite_path() -> PathBuf {
    PathBuf::from("studyhub-session.db")
}
fn default_chat_api_url() -> String {
    DEFAULT_CHAT_API_URL.to_string()
}
fn default_chat_model() -> String {
    DEFAULT_CHAT_MODEL.to_string()
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            log_level: default_log_level(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            session: SessionConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}

impl PortalConfig {
    /// Load configuration from TOML file with environment variable overrides.
    ///
    /// Reads `.env` if present, then `portal.toml` from CWD (or the path in
    /// `STUDYHUB_CONFIG_PATH`). A missing file means all defaults.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();
        let path = std::env::var("STUDYHUB_CONFIG_PATH")
            .unwrap_or_else(|_| "portal.toml".to_string());
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(format!("failed to read {path}: {e}").into()),
        };
        Self::from_toml_str(&contents)
    }

    /// Load configuration from a TOML string, then apply env var overrides.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config: PortalConfig = toml::from_str(toml_str)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides to the config.
    ///
    /// Returns an error if an env var is set but has an invalid format
    /// (e.g., STUDYHUB_REQUEST_TIMEOUT_SECS=soon).
    pub fn apply_env_overrides(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Ok(val) = std::env::var("STUDYHUB_API_BASE_URL") {
            self.api_base_url = val;
        }
        if let Ok(val) = std::env::var("STUDYHUB_LOG_LEVEL") {
            self.log_level = val;
        }
        if let Ok(val) = std::env::var("STUDYHUB_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = val
                .parse()
                .map_err(|_| format!("invalid STUDYHUB_REQUEST_TIMEOUT_SECS value: {val}"))?;
        }
        if let Ok(val) = std::env::var("STUDYHUB_SESSION_MAX_AGE_DAYS") {
            self.session.max_age_days = val
                .parse()
                .map_err(|_| format!("invalid STUDYHUB_SESSION_MAX_AGE_DAYS value: {val}"))?;
        }
        if let Ok(val) = std::env::var("STUDYHUB_SESSION_STORAGE") {
            self.session.storage = val.parse()?;
        }
        if let Ok(val) = std::env::var("STUDYHUB_SESSION_DB") {
            self.session.sqlite_path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("STUDYHUB_CHAT_API_URL") {
            self.chat.api_url = val;
        }
        if let Ok(val) = std::env::var("STUDYHUB_CHAT_MODEL") {
            self.chat.model = val;
        }
        if let Ok(val) = std::env::var("STUDYHUB_CHAT_API_KEY") {
            self.chat.api_key = val;
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.connect_timeout_secs)
    }

    /// `None` when `session.max_age_days` is not positive or expiring that
    /// far out cannot be represented.
    pub fn session_max_age(&self) -> Option<chrono::Duration> {
        let max_age = chrono::Duration::try_days(self.session.max_age_days)?;
        let representable = chrono::Utc::now().checked_add_signed(max_age).is_some();
        (max_age > chrono::Duration::zero() && representable).then_some(max_age)
    }
}
