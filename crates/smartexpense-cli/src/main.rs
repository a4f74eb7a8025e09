//! SmartExpense CLI - prototype expense tracker
//!
//! Usage:
//!   smartexpense signup -e E -p P -c P   Create the account
//!   smartexpense login -e E -p P         Log in
//!   smartexpense chat                    Talk to ExpenseBot
//!   smartexpense serve --port 3000       Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref(), cli.storage.as_deref())?;

    match cli.command {
        Commands::Signup {
            email,
            password,
            confirm,
        } => {
            let gate = commands::open_gate(&config)?;
            commands::cmd_signup(&gate, &email, &password, &confirm)
        }
        Commands::Login { email, password } => {
            let gate = commands::open_gate(&config)?;
            commands::cmd_login(&gate, &email, &password)
        }
        Commands::Logout => {
            let gate = commands::open_gate(&config)?;
            commands::cmd_logout(&gate)
        }
        Commands::Status { json } => commands::cmd_status(&config, json),
        Commands::Dashboard => {
            let gate = commands::open_gate(&config)?;
            commands::cmd_dashboard(&gate)
        }
        Commands::Chat { message } => {
            let gate = commands::open_gate(&config)?;
            commands::cmd_chat(&gate, &config.chat_bot(), &message).await
        }
        Commands::Rules { action } => {
            let bot = config.chat_bot();
            match action {
                None | Some(RulesAction::List) => commands::cmd_rules_list(bot.engine()),
                Some(RulesAction::Test { text }) => commands::cmd_rules_test(bot.engine(), &text),
            }
        }
        Commands::Serve {
            port,
            host,
            allow_origin,
        } => {
            let host = host.unwrap_or_else(|| config.host.clone());
            let port = port.unwrap_or(config.port);
            commands::cmd_serve(&config, &host, port, allow_origin).await
        }
    }
}
