//! Chat handlers - ExpenseBot conversations over JSON
//!
//! Each open dashboard view owns one conversation, identified by an opaque ID.
//! The reply delay runs without holding the manager lock, so a view can be
//! torn down (DELETE) while a reply is pending; the late reply is then dropped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::{AppError, AppState};
use smartexpense_core::{ChatMessage, Conversation, PendingTurn};

/// Conversation timeout (30 minutes of inactivity)
pub const CONVERSATION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
struct ChatSession {
    last_activity: Instant,
    conversation: Conversation,
}

impl ChatSession {
    fn new() -> Self {
        Self {
            last_activity: Instant::now(),
            conversation: Conversation::new(),
        }
    }

    fn is_expired(&self) -> bool {
        self.last_activity.elapsed() > CONVERSATION_TIMEOUT
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}

/// Point-in-time view of one conversation
#[derive(Debug, Clone, Serialize)]
pub struct ChatSnapshot {
    pub session_id: String,
    /// A reply is pending (typing indicator)
    pub thinking: bool,
    pub messages: Vec<ChatMessage>,
}

/// In-memory conversation manager
#[derive(Debug, Default)]
pub struct ConversationManager {
    sessions: RwLock<HashMap<String, ChatSession>>,
    counter: AtomicU64,
}

impl ConversationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a conversation (with the welcome line) and return its ID
    pub async fn create(&self) -> String {
        // Timestamp + counter so IDs minted in the same instant still differ
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let mut hasher = Sha256::new();
        hasher.update(timestamp.to_le_bytes());
        hasher.update(n.to_le_bytes());
        let hash = hasher.finalize();
        let session_id = format!("chat_{:x}", hash)[..21].to_string();

        let mut sessions = self.sessions.write().await;

        // Clean up expired conversations while we're here
        sessions.retain(|_, s| !s.is_expired());

        sessions.insert(session_id.clone(), ChatSession::new());
        session_id
    }

    /// Append the user's line and open a turn
    ///
    /// `None` if the conversation is unknown or expired, or the text is blank.
    pub async fn submit(&self, session_id: &str, text: &str) -> Option<PendingTurn> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(session_id).filter(|s| !s.is_expired())?;
        session.touch();
        session.conversation.submit(text)
    }

    /// Deliver a reply. False if the conversation or the turn is gone.
    pub async fn complete(&self, session_id: &str, turn: &PendingTurn, reply: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session_id) {
            Some(session) => {
                session.touch();
                session.conversation.complete(turn, reply)
            }
            None => {
                debug!(session_id = %session_id, "Conversation closed before reply");
                false
            }
        }
    }

    pub async fn snapshot(&self, session_id: &str) -> Option<ChatSnapshot> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .filter(|s| !s.is_expired())
            .map(|s| ChatSnapshot {
                session_id: session_id.to_string(),
                thinking: s.conversation.is_thinking(),
                messages: s.conversation.messages().to_vec(),
            })
    }

    /// Tear a conversation down, cancelling pending replies
    ///
    /// Returns how many replies were pending, or `None` if it did not exist.
    pub async fn close(&self, session_id: &str) -> Option<usize> {
        let mut sessions = self.sessions.write().await;
        sessions
            .remove(session_id)
            .map(|mut s| s.conversation.cancel_pending())
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    /// Conversation to continue (a new one is opened if omitted)
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    /// Bot reply, absent if the conversation was closed while thinking
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    pub delivered: bool,
    pub messages: Vec<ChatMessage>,
}

/// POST /api/chat - Send a message and wait for ExpenseBot's reply
pub async fn post_chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if payload.message.trim().is_empty() {
        return Err(AppError::bad_request("Message must not be blank"));
    }

    let session_id = match payload.session_id {
        Some(id) => id,
        None => state.conversations.create().await,
    };

    let turn = state
        .conversations
        .submit(&session_id, &payload.message)
        .await
        .ok_or_else(|| AppError::not_found("Conversation not found or expired"))?;

    // Lock is not held while the bot is "typing"
    let reply = state.bot.think(&turn).await;
    let delivered = state
        .conversations
        .complete(&session_id, &turn, &reply)
        .await;

    debug!(session_id = %session_id, delivered, "Chat turn finished");

    let messages = state
        .conversations
        .snapshot(&session_id)
        .await
        .map(|s| s.messages)
        .unwrap_or_default();

    Ok(Json(ChatResponse {
        session_id,
        reply: delivered.then_some(reply),
        delivered,
        messages,
    }))
}

/// GET /api/chat/:id - Conversation history and typing state
pub async fn get_chat(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<ChatSnapshot>, AppError> {
    let snapshot = state
        .conversations
        .snapshot(&session_id)
        .await
        .ok_or_else(|| AppError::not_found("Conversation not found or expired"))?;

    Ok(Json(snapshot))
}

/// DELETE /api/chat/:id - View teardown
pub async fn delete_chat(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Json<serde_json::Value> {
    let cancelled = state.conversations.close(&session_id).await;

    debug!(session_id = %session_id, ?cancelled, "Closed conversation");

    Json(serde_json::json!({
        "deleted": cancelled.is_some(),
        "cancelled": cancelled.unwrap_or(0),
    }))
}
