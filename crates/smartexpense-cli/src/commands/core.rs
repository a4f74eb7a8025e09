//! Shared utilities for commands
//!
//! - `load_config` - Resolve config with the `--storage` override applied
//! - `open_gate` - Open the auth gate over the configured storage file
//! - `require_user` - Guard for commands that need a session

use std::path::Path;

use anyhow::{bail, Context, Result};
use smartexpense_core::{AppConfig, AuthError, AuthGate, Credential, Error as CoreError};

/// Resolve config: defaults, config file, environment, then `--storage`
pub fn load_config(config_path: Option<&Path>, storage: Option<&Path>) -> Result<AppConfig> {
    let mut config = AppConfig::load(config_path).context("Failed to load config")?;
    if let Some(path) = storage {
        config.storage_path = path.to_path_buf();
    }
    Ok(config)
}

/// Open the auth gate over the configured storage file
pub fn open_gate(config: &AppConfig) -> Result<AuthGate> {
    config.open_auth_gate().with_context(|| {
        format!(
            "Failed to open storage at {}",
            config.storage_path.display()
        )
    })
}

/// The signed-in user, or an error telling how to log in
pub fn require_user(gate: &AuthGate) -> Result<Credential> {
    match gate.require_session() {
        Ok(user) => Ok(user),
        Err(CoreError::Auth(AuthError::NoActiveSession)) => {
            bail!("Not logged in. Run `smartexpense login` first.")
        }
        Err(e) => Err(e).context("Failed to read session"),
    }
}
