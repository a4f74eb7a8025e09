//! Account command implementations (signup, login, logout)

use anyhow::{anyhow, Result};
use smartexpense_core::{AuthGate, AuthOutcome, Error as CoreError, NoticeLevel, Result as CoreResult};

/// Print the notice of an auth action; domain failures become errors
fn report(result: CoreResult<AuthOutcome>) -> Result<()> {
    match result {
        Ok(outcome) => {
            let icon = match outcome.notice.level {
                NoticeLevel::Success => "✅",
                NoticeLevel::Error => "❌",
            };
            println!("{} {}", icon, outcome.notice.message);
            println!("   Next: {}", outcome.redirect);
            Ok(())
        }
        Err(CoreError::Auth(e)) => Err(anyhow!("{}", e)),
        Err(e) => Err(e.into()),
    }
}

pub fn cmd_signup(gate: &AuthGate, email: &str, password: &str, confirm: &str) -> Result<()> {
    report(gate.sign_up(email, password, confirm))
}

pub fn cmd_login(gate: &AuthGate, email: &str, password: &str) -> Result<()> {
    report(gate.sign_in(email, password))
}

pub fn cmd_logout(gate: &AuthGate) -> Result<()> {
    report(gate.logout())
}
