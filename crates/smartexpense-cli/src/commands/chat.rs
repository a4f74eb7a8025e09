//! Chat command implementation
//!
//! Turns run through the same `Conversation` state machine as the web view:
//! the user line is recorded first, the bot "types" for the configured delay,
//! then the reply is delivered. Ctrl+C at the prompt leaves the chat; Ctrl+C
//! while the bot is typing also discards the pending reply.

use std::collections::VecDeque;
use std::io::{self, IsTerminal, Write};

use anyhow::{anyhow, Result};
use rustyline_async::{Readline, ReadlineEvent, SharedWriter};
use smartexpense_core::{AuthGate, ChatBot, Conversation, Sender, WELCOME_MESSAGE};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::{debug, warn};

use super::require_user;

pub async fn cmd_chat(gate: &AuthGate, bot: &ChatBot, messages: &[String]) -> Result<()> {
    let user = require_user(gate)?;
    debug!(user = %user.email, "Starting chat");

    if !messages.is_empty() {
        run_messages(bot, messages, io::stdout()).await?;
        return Ok(());
    }

    if io::stdin().is_terminal() {
        let (input, writer) = TerminalInput::new("> ")?;
        run_repl(bot, input, writer).await?;
    } else {
        let input = LineInput::new(BufReader::new(tokio::io::stdin()));
        run_repl(bot, input, io::stdout()).await?;
    }
    Ok(())
}

/// What the user did at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Line(String),
    /// Ctrl+D or end of piped input
    Eof,
    /// Ctrl+C
    Interrupted,
}

/// Source of REPL input
///
/// `read_line` must be cancel-safe: the REPL races it against the bot's
/// reply and drops it when the reply wins.
pub trait ChatInput {
    async fn read_line(&mut self) -> InputEvent;
}

/// Interactive terminal input with its own prompt and Ctrl+C handling
pub struct TerminalInput {
    rl: Readline,
}

impl TerminalInput {
    /// Returns the input and a writer that prints above the prompt
    pub fn new(prompt: &str) -> Result<(Self, SharedWriter)> {
        let (rl, writer) = Readline::new(prompt.to_string())
            .map_err(|e| anyhow!("Failed to initialize terminal input: {e}"))?;
        Ok((Self { rl }, writer))
    }
}

impl Drop for TerminalInput {
    // Print whatever is still buffered in the shared writer
    fn drop(&mut self) {
        let _ = self.rl.flush();
    }
}

impl ChatInput for TerminalInput {
    async fn read_line(&mut self) -> InputEvent {
        match self.rl.readline().await {
            Ok(ReadlineEvent::Line(line)) => InputEvent::Line(line),
            Ok(ReadlineEvent::Eof) => InputEvent::Eof,
            Ok(ReadlineEvent::Interrupted) => InputEvent::Interrupted,
            Err(e) => {
                warn!("Terminal input failed: {}", e);
                InputEvent::Eof
            }
        }
    }
}

/// Line-by-line input from a pipe or file
pub struct LineInput<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

impl<R: AsyncBufRead + Unpin> ChatInput for LineInput<R> {
    async fn read_line(&mut self) -> InputEvent {
        match self.lines.next_line().await {
            Ok(Some(line)) => InputEvent::Line(line),
            Ok(None) => InputEvent::Eof,
            Err(e) => {
                warn!("Failed to read input: {}", e);
                InputEvent::Eof
            }
        }
    }
}

fn print_line<W: Write>(out: &mut W, sender: Sender, text: &str) -> io::Result<()> {
    match sender {
        Sender::Bot => writeln!(out, "🤖 {}", text),
        Sender::User => writeln!(out, "🧑 {}", text),
    }
}

fn is_exit_command(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit")
}

/// Send each message in order, waiting for every reply
pub async fn run_messages<W: Write>(
    bot: &ChatBot,
    messages: &[String],
    mut out: W,
) -> Result<Conversation> {
    let mut conversation = Conversation::new();
    print_line(&mut out, Sender::Bot, WELCOME_MESSAGE)?;

    for message in messages {
        let Some(turn) = conversation.submit(message) else {
            continue;
        };
        print_line(&mut out, Sender::User, message)?;
        writeln!(out, "   Typing...")?;
        let reply = bot.think(&turn).await;
        if conversation.complete(&turn, reply.as_str()) {
            print_line(&mut out, Sender::Bot, &reply)?;
        }
    }

    Ok(conversation)
}

/// Interactive loop until `exit`, `quit`, Ctrl+C or end of input
///
/// Input keeps being read while the bot is typing. Lines typed meanwhile are
/// queued and answered in order.
pub async fn run_repl<I: ChatInput, W: Write>(
    bot: &ChatBot,
    mut input: I,
    mut out: W,
) -> Result<Conversation> {
    let mut conversation = Conversation::new();
    print_line(&mut out, Sender::Bot, WELCOME_MESSAGE)?;
    writeln!(out, "   (type 'exit' or press Ctrl+C to leave)")?;
    out.flush()?;

    let mut queued: VecDeque<String> = VecDeque::new();
    let mut input_closed = false;

    loop {
        let line = match queued.pop_front() {
            Some(line) => line,
            None if input_closed => break,
            None => match input.read_line().await {
                InputEvent::Line(line) => line,
                InputEvent::Eof => {
                    writeln!(out)?;
                    break;
                }
                InputEvent::Interrupted => {
                    debug!("Chat interrupted at prompt");
                    writeln!(out)?;
                    break;
                }
            },
        };

        if is_exit_command(&line) {
            break;
        }
        let Some(turn) = conversation.submit(&line) else {
            continue;
        };
        writeln!(out, "   Typing...")?;
        out.flush()?;

        let think = bot.think(&turn);
        tokio::pin!(think);
        let reply = loop {
            tokio::select! {
                reply = &mut think => break Some(reply),
                event = input.read_line(), if !input_closed => match event {
                    InputEvent::Line(line) => queued.push_back(line),
                    InputEvent::Eof => input_closed = true,
                    InputEvent::Interrupted => break None,
                },
            }
        };

        let Some(reply) = reply else {
            let cancelled = conversation.cancel_pending();
            debug!(cancelled, "Chat interrupted while typing");
            writeln!(out)?;
            break;
        };
        if conversation.complete(&turn, reply.as_str()) {
            print_line(&mut out, Sender::Bot, &reply)?;
            out.flush()?;
        }
    }

    Ok(conversation)
}
