//! Server command implementation

use anyhow::Result;
use smartexpense_core::AppConfig;

use super::open_gate;

pub async fn cmd_serve(
    config: &AppConfig,
    host: &str,
    port: u16,
    allowed_origins: Vec<String>,
) -> Result<()> {
    println!("🚀 Starting SmartExpense web server...");
    println!("   Storage: {}", config.storage_path.display());
    println!("   Listening: http://{}:{}", host, port);
    println!("   Reply delay: {} ms", config.reply_delay.as_millis());
    if !allowed_origins.is_empty() {
        println!("   🌐 CORS origins: {}", allowed_origins.join(", "));
    }
    println!();
    println!("   ⚠️  Prototype auth only: credentials are stored in plain text");
    println!("   Press Ctrl+C to stop");

    let gate = open_gate(config)?;
    let server_config = smartexpense_server::ServerConfig { allowed_origins };

    smartexpense_server::serve_with_config(gate, config.chat_bot(), host, port, server_config)
        .await?;

    Ok(())
}
