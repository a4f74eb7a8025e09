//! Status and dashboard command implementations

use anyhow::Result;
use smartexpense_core::{dashboard::APP_NAME, AppConfig, AuthGate, DashboardView};

use super::{open_gate, require_user};

pub fn cmd_status(config: &AppConfig, json: bool) -> Result<()> {
    let gate = open_gate(config)?;
    let user = gate.store().load()?;

    if json {
        let status = serde_json::json!({
            "storage": config.storage_path.display().to_string(),
            "key": config.storage_key,
            "logged_in": user.is_some(),
            "email": user.as_ref().map(|u| u.email.as_str()),
            "reply_delay_ms": config.reply_delay.as_millis() as u64,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!("📊 {} Status", APP_NAME);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Storage: {}", config.storage_path.display());
    println!("   Key: {}", config.storage_key);
    println!("   Reply delay: {} ms", config.reply_delay.as_millis());
    match user {
        Some(user) => println!("   🔓 Logged in as {}", user.email),
        None => println!("   🔒 Not logged in"),
    }
    println!();
    Ok(())
}

pub fn cmd_dashboard(gate: &AuthGate) -> Result<()> {
    let user = require_user(gate)?;
    let view = DashboardView::for_user(&user);

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│        💰 {:<30}│", format!("{} {}", APP_NAME, view.title));
    println!("╰─────────────────────────────────────────╯");
    println!("  {}  (logout: smartexpense logout)", view.email);
    println!();
    println!("  Overview");
    println!("    {}", view.overview);
    println!();
    for feature in view.features {
        println!("  • {}", feature.title);
        println!("    {}", feature.description);
    }
    println!();
    println!("  🤖 {}: {}", view.bot_name, view.bot_tagline);
    println!("     Try: {}", view.quick_replies.join(" | "));
    println!();
    Ok(())
}
