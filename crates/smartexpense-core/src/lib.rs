//! SmartExpense Core Library
//!
//! Shared functionality for the SmartExpense prototype:
//! - Key-value storage with pluggable backends (memory, JSON file)
//! - Session store holding the single credential record
//! - Authentication gate (sign-up, sign-in, logout, route guard)
//! - Route resolution with session-aware redirects
//! - ExpenseBot reply engine (ordered regex rules, first match wins)
//! - Conversation state with cancellable pending replies
//! - Canned dashboard content
//! - Layered configuration (defaults, TOML, environment)
//!
//! Nothing here is production authentication: credentials are stored and
//! compared in plain text.

pub mod auth;
pub mod chat;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod reply;
pub mod routes;
pub mod session;
pub mod storage;

pub use auth::{AuthGate, AuthOutcome};
pub use chat::{ChatBot, Conversation, PendingTurn, TurnState, QUICK_REPLIES, WELCOME_MESSAGE};
pub use config::AppConfig;
pub use dashboard::DashboardView;
pub use error::{AuthError, Error, Result};
pub use models::{ChatMessage, Credential, Notice, NoticeLevel, Sender};
pub use reply::{Decision, Reply, ReplyEngine, ReplyRule, Responder, RuleKind};
pub use routes::{resolve, Navigation, Route};
pub use session::SessionStore;
pub use storage::{FileStorage, MemoryStorage, SharedStorage, StorageBackend};
