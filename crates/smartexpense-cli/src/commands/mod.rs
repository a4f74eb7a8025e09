//! CLI command implementations
//!
//! Commands are organized by area:
//! - `auth` - Account commands (signup, login, logout)
//! - `chat` - ExpenseBot chat (scripted messages or interactive)
//! - `core` - Shared utilities (load_config, open_gate, require_user)
//! - `rules` - Reply rule listing and testing
//! - `serve` - Web server command
//! - `status` - Status and dashboard commands

pub mod auth;
pub mod chat;
pub mod core;
pub mod rules;
pub mod serve;
pub mod status;

// Re-export command functions for main.rs
pub use auth::*;
pub use chat::*;
pub use core::*;
pub use rules::*;
pub use serve::*;
pub use status::*;
