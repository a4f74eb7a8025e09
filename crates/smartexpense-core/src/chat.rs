//! Conversation state and the Idle → Thinking → Idle turn cycle
//!
//! A turn starts when non-blank text is submitted: the user's line is
//! appended at once and a `PendingTurn` ticket is handed back. The reply is
//! computed after an artificial delay and delivered with `complete`. Tearing
//! the view down calls `cancel_pending`, after which late replies are dropped
//! instead of appended.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use crate::models::{ChatMessage, Sender};
use crate::reply::ReplyEngine;

/// First bot line of every new conversation
pub const WELCOME_MESSAGE: &str = "Hi! I'm ExpenseBot. Ask me about your expenses or say 'help'.";

/// One-tap prompts offered next to the input box
pub const QUICK_REPLIES: [&str; 4] = ["help", "categories", "summary", "add expense 250"];

/// Default artificial "typing" delay
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(700);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnState {
    Idle,
    /// At least one reply is pending (typing indicator shown)
    Thinking,
}

/// Ticket for a reply that has not been delivered yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    ticket: u64,
    epoch: u64,
    text: String,
}

impl PendingTurn {
    /// The user text this turn answers
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// In-memory chat history for one view
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    next_id: u64,
    next_ticket: u64,
    /// Bumped on teardown; turns from an older epoch are stale
    epoch: u64,
    pending: Vec<u64>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// A conversation opened with the bot's welcome line
    pub fn new() -> Self {
        let mut conversation = Self::empty();
        conversation.push(Sender::Bot, WELCOME_MESSAGE);
        conversation
    }

    /// A conversation with no history at all
    pub fn empty() -> Self {
        Self {
            messages: Vec::new(),
            next_id: 1,
            next_ticket: 1,
            epoch: 0,
            pending: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn state(&self) -> TurnState {
        if self.pending.is_empty() {
            TurnState::Idle
        } else {
            TurnState::Thinking
        }
    }

    pub fn is_thinking(&self) -> bool {
        self.state() == TurnState::Thinking
    }

    /// Append the user's line and open a turn. Blank input is ignored.
    pub fn submit(&mut self, text: &str) -> Option<PendingTurn> {
        if text.trim().is_empty() {
            return None;
        }

        self.push(Sender::User, text);

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.pending.push(ticket);

        Some(PendingTurn {
            ticket,
            epoch: self.epoch,
            text: text.to_string(),
        })
    }

    /// Deliver a reply for `turn`
    ///
    /// Returns false, appending nothing, if the turn was cancelled or has
    /// already been completed.
    pub fn complete(&mut self, turn: &PendingTurn, reply: impl Into<String>) -> bool {
        if turn.epoch != self.epoch {
            debug!(ticket = turn.ticket, "Dropping reply for cancelled turn");
            return false;
        }
        let Some(pos) = self.pending.iter().position(|t| *t == turn.ticket) else {
            debug!(ticket = turn.ticket, "Dropping reply for unknown turn");
            return false;
        };

        self.pending.remove(pos);
        self.push(Sender::Bot, &reply.into());
        true
    }

    /// Invalidate every pending turn. Returns how many were pending.
    pub fn cancel_pending(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        self.epoch += 1;
        if cancelled > 0 {
            debug!(cancelled, "Cancelled pending replies");
        }
        cancelled
    }

    fn push(&mut self, sender: Sender, text: &str) {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            sender,
            text: text.to_string(),
            sent_at: Utc::now(),
        });
    }
}

/// Reply engine plus the artificial thinking delay
#[derive(Debug, Clone)]
pub struct ChatBot {
    engine: ReplyEngine,
    delay: Duration,
}

impl Default for ChatBot {
    fn default() -> Self {
        Self::new(ReplyEngine::default(), DEFAULT_REPLY_DELAY)
    }
}

impl ChatBot {
    pub fn new(engine: ReplyEngine, delay: Duration) -> Self {
        Self { engine, delay }
    }

    pub fn engine(&self) -> &ReplyEngine {
        &self.engine
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait out the delay, then compute the reply for `turn`
    pub async fn think(&self, turn: &PendingTurn) -> String {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.engine.reply(turn.text())
    }

    /// Run a whole turn against a conversation the caller owns exclusively
    ///
    /// Returns the delivered reply, or `None` for blank input.
    pub async fn send(&self, conversation: &mut Conversation, text: &str) -> Option<String> {
        let turn = conversation.submit(text)?;
        let reply = self.think(&turn).await;
        conversation.complete(&turn, reply.clone());
        Some(reply)
    }
}
