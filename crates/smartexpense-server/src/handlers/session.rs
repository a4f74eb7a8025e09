//! Session status handler

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::{AppError, AppState};

/// Response for the /api/session endpoint
#[derive(Serialize)]
pub struct SessionResponse {
    pub logged_in: bool,
    /// Signed-in user's email (never the password)
    pub email: Option<String>,
}

/// GET /api/session
pub async fn get_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionResponse>, AppError> {
    let user = state.auth.store().load()?;

    Ok(Json(SessionResponse {
        logged_in: user.is_some(),
        email: user.map(|u| u.email),
    }))
}
