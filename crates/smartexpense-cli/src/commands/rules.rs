//! Reply rule inspection commands

use anyhow::Result;
use smartexpense_core::{Decision, ReplyEngine};

/// List reply rules in evaluation order
pub fn cmd_rules_list(engine: &ReplyEngine) -> Result<()> {
    println!("ExpenseBot rules (first match wins):\n");
    println!("{:<4} {:<14} {:<8}  PATTERN", "#", "KIND", "STATUS");
    println!("{}", "-".repeat(60));

    for (i, rule) in engine.rules().iter().enumerate() {
        let status = if rule.is_enabled() { "ok" } else { "disabled" };
        println!(
            "{:<4} {:<14} {:<8}  {}",
            i + 1,
            rule.kind(),
            status,
            rule.pattern()
        );
    }

    println!();
    println!("Unmatched text mentioning a number and 'expense' gets a mock acknowledgement;");
    println!("anything else gets the fallback reply.");
    Ok(())
}

/// Explain which rule answers `text`
pub fn cmd_rules_test(engine: &ReplyEngine, text: &str) -> Result<()> {
    let reply = engine.dispatch(text);

    let decided_by = match reply.decision {
        Decision::Rule(kind) => format!("rule '{}'", kind),
        Decision::ExpenseNoted => "expense heuristic".to_string(),
        Decision::Fallback => "fallback".to_string(),
    };

    println!("Input:   {}", text);
    println!("Matched: {}", decided_by);
    println!("Reply:   {}", reply.text);
    Ok(())
}
