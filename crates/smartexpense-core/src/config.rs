//! Application configuration
//!
//! ## Resolution
//!
//! Config is resolved in three layers, later layers winning:
//! 1. Built-in defaults
//! 2. TOML file: the explicit path if given, otherwise
//!    `~/.local/share/smartexpense/config.toml` when it exists
//! 3. `SMARTEXPENSE_*` environment variables
//!
//! ```toml
//! [storage]
//! path = "/var/lib/smartexpense/storage.json"
//! key = "user"
//!
//! [chat]
//! reply_delay_ms = 700
//!
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::auth::AuthGate;
use crate::chat::{ChatBot, DEFAULT_REPLY_DELAY};
use crate::error::{Error, Result};
use crate::reply::ReplyEngine;
use crate::session::{SessionStore, DEFAULT_SESSION_KEY};
use crate::storage::{default_storage_path, FileStorage};

pub const ENV_STORAGE: &str = "SMARTEXPENSE_STORAGE";
pub const ENV_STORAGE_KEY: &str = "SMARTEXPENSE_STORAGE_KEY";
pub const ENV_REPLY_DELAY_MS: &str = "SMARTEXPENSE_REPLY_DELAY_MS";
pub const ENV_HOST: &str = "SMARTEXPENSE_HOST";
pub const ENV_PORT: &str = "SMARTEXPENSE_PORT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// JSON file backing the session store
    pub storage_path: PathBuf,
    /// Key of the credential slot
    pub storage_key: String,
    /// Artificial chatbot "typing" delay
    pub reply_delay: Duration,
    pub host: String,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            storage_key: DEFAULT_SESSION_KEY.to_string(),
            reply_delay: DEFAULT_REPLY_DELAY,
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Default config override location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("smartexpense").join("config.toml"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    storage: Option<RawStorage>,
    chat: Option<RawChat>,
    server: Option<RawServer>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStorage {
    path: Option<PathBuf>,
    key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawChat {
    reply_delay_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawServer {
    host: Option<String>,
    port: Option<u16>,
}

impl AppConfig {
    /// Resolve config from defaults, file and process environment
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) => Some(fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read config {}: {}", path.display(), e))
            })?),
            None => match default_config_path() {
                Some(default_path) if default_path.exists() => {
                    debug!(path = %default_path.display(), "Loading config override");
                    Some(fs::read_to_string(&default_path).map_err(|e| {
                        Error::Config(format!("Failed to read config: {}", e))
                    })?)
                }
                _ => None,
            },
        };

        let mut config = match content {
            Some(content) => Self::from_toml(&content)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Parse TOML on top of the defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Self::default();

        if let Some(storage) = raw.storage {
            if let Some(path) = storage.path {
                config.storage_path = path;
            }
            if let Some(key) = storage.key {
                config.storage_key = key;
            }
        }
        if let Some(chat) = raw.chat {
            if let Some(ms) = chat.reply_delay_ms {
                config.reply_delay = Duration::from_millis(ms);
            }
        }
        if let Some(server) = raw.server {
            if let Some(host) = server.host {
                config.host = host;
            }
            if let Some(port) = server.port {
                config.port = port;
            }
        }

        if config.storage_key.trim().is_empty() {
            return Err(Error::Config("storage.key must not be empty".to_string()));
        }

        Ok(config)
    }

    /// Apply environment overrides read through `lookup`
    ///
    /// Unparseable numeric values are ignored with a warning.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(path) = get(ENV_STORAGE) {
            self.storage_path = PathBuf::from(path);
        }
        if let Some(key) = get(ENV_STORAGE_KEY) {
            self.storage_key = key;
        }
        if let Some(ms) = get(ENV_REPLY_DELAY_MS) {
            match ms.trim().parse::<u64>() {
                Ok(ms) => self.reply_delay = Duration::from_millis(ms),
                Err(_) => warn!(value = %ms, "Ignoring invalid {}", ENV_REPLY_DELAY_MS),
            }
        }
        if let Some(host) = get(ENV_HOST) {
            self.host = host;
        }
        if let Some(port) = get(ENV_PORT) {
            match port.trim().parse::<u16>() {
                Ok(port) => self.port = port,
                Err(_) => warn!(value = %port, "Ignoring invalid {}", ENV_PORT),
            }
        }
    }

    /// Open the file-backed session store this config points at
    pub fn open_session_store(&self) -> Result<SessionStore> {
        let storage = FileStorage::new(&self.storage_path)?;
        Ok(SessionStore::with_key(Arc::new(storage), self.storage_key.clone()))
    }

    /// Auth gate over the configured store
    pub fn open_auth_gate(&self) -> Result<AuthGate> {
        Ok(AuthGate::new(self.open_session_store()?))
    }

    /// Chatbot with the built-in rules and the configured delay
    pub fn chat_bot(&self) -> ChatBot {
        ChatBot::new(ReplyEngine::default(), self.reply_delay)
    }
}
