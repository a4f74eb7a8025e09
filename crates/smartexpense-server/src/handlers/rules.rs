//! Reply rule introspection

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;
use smartexpense_core::RuleKind;

#[derive(Debug, Serialize)]
pub struct RuleInfo {
    pub kind: RuleKind,
    pub pattern: String,
    /// False when the pattern failed to compile
    pub enabled: bool,
}

/// GET /api/rules - Reply rules in evaluation order
pub async fn list_rules(State(state): State<Arc<AppState>>) -> Json<Vec<RuleInfo>> {
    let rules = state
        .bot
        .engine()
        .rules()
        .iter()
        .map(|rule| RuleInfo {
            kind: rule.kind(),
            pattern: rule.pattern().to_string(),
            enabled: rule.is_enabled(),
        })
        .collect();

    Json(rules)
}
