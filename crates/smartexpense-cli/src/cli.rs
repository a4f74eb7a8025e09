//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// SmartExpense - prototype expense tracker with a scripted chatbot
#[derive(Parser)]
#[command(name = "smartexpense")]
#[command(about = "SmartExpense prototype: sign-up, sign-in, dashboard and ExpenseBot", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Storage file holding the session (overrides config and SMARTEXPENSE_STORAGE)
    #[arg(long, global = true)]
    pub storage: Option<PathBuf>,

    /// Config file (defaults to ~/.local/share/smartexpense/config.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the account (replaces any existing one)
    Signup {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Password confirmation, must equal --password
        #[arg(short, long)]
        confirm: String,
    },

    /// Log in with the stored account
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Log out (clears the stored account)
    Logout,

    /// Show storage location and session state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the dashboard (requires a session)
    Dashboard,

    /// Chat with ExpenseBot (requires a session)
    ///
    /// Without --message, starts an interactive session; type 'exit' or
    /// 'quit' (or press Ctrl+C or Ctrl+D) to leave.
    Chat {
        /// Message to send; repeat to send several in order
        #[arg(short, long = "message")]
        message: Vec<String>,
    },

    /// Inspect the chatbot reply rules
    Rules {
        #[command(subcommand)]
        action: Option<RulesAction>,
    },

    /// Start the web server
    Serve {
        /// Port to listen on (defaults to config, then 3000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to config, then 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Allowed CORS origin; repeat for several
        #[arg(long = "allow-origin")]
        allow_origin: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum RulesAction {
    /// List rules in evaluation order
    List,

    /// Show which rule answers a message, and the reply
    Test {
        /// Message text
        text: String,
    },
}
