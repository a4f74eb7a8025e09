//! Page handlers - server-rendered views and auth form posts
//!
//! Every navigation re-reads the session. Form posts answer `303 See Other`
//! and leave a notice for the next rendered page.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::debug;

use crate::{views, AppError, AppState};
use smartexpense_core::{
    AuthOutcome, DashboardView, Error as CoreError, Navigation, Result as CoreResult, Route,
};

const CHAT_SCRIPT: &str = include_str!("../../assets/chat.js");

#[derive(Debug, Deserialize)]
pub struct SignUpForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Resolve `path` against the current session and render or redirect
async fn navigate(state: &AppState, path: &str) -> Result<Response, AppError> {
    match state.auth.navigate(path)? {
        Navigation::Redirect(route) => {
            debug!(from = %path, to = %route, "Redirecting");
            Ok(Redirect::to(route.path()).into_response())
        }
        Navigation::Render(Route::SignUp) => {
            Ok(Html(views::signup_page(state.take_notice().as_ref())).into_response())
        }
        Navigation::Render(Route::SignIn) => {
            Ok(Html(views::login_page(state.take_notice().as_ref())).into_response())
        }
        Navigation::Render(Route::Dashboard) => render_dashboard(state).await,
        // Landing and NotFound never render
        Navigation::Render(_) => Ok(Redirect::to(Route::Landing.path()).into_response()),
    }
}

/// Every rendered dashboard opens its own conversation, so the chat panel
/// never has to mint one from its first message.
async fn render_dashboard(state: &AppState) -> Result<Response, AppError> {
    match state.auth.require_session() {
        Ok(user) => {
            let view = DashboardView::for_user(&user);
            let chat_id = state.conversations.create().await;
            let html = views::dashboard_page(&view, &chat_id, state.take_notice().as_ref());
            Ok(Html(html).into_response())
        }
        // Session vanished between the route check and the read
        Err(CoreError::Auth(err)) => {
            let to = err.redirect().unwrap_or(Route::SignIn);
            Ok(Redirect::to(to.path()).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Store the notice of an auth action and pick where the browser goes next
fn finish_auth_action(
    state: &AppState,
    result: CoreResult<AuthOutcome>,
    on_failure: Route,
) -> Result<Redirect, AppError> {
    match result {
        Ok(outcome) => {
            state.set_notice(outcome.notice);
            Ok(Redirect::to(outcome.redirect.path()))
        }
        Err(CoreError::Auth(err)) => {
            if let Some(notice) = err.notice() {
                state.set_notice(notice);
            }
            let to = err.redirect().unwrap_or(on_failure);
            Ok(Redirect::to(to.path()))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /
pub async fn landing(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    navigate(&state, Route::Landing.path()).await
}

/// GET /signup
pub async fn signup_page(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    navigate(&state, Route::SignUp.path()).await
}

/// GET /login
pub async fn login_page(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    navigate(&state, Route::SignIn.path()).await
}

/// GET /dashboard (and anything below it)
pub async fn dashboard_page(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    navigate(&state, Route::Dashboard.path()).await
}

/// Catch-all: unknown pages go to the landing route, unknown API paths 404
pub async fn not_found(
    State(state): State<Arc<AppState>>,
    uri: Uri,
) -> Result<Response, AppError> {
    if uri.path().starts_with("/api/") {
        return Err(AppError::not_found("Not found"));
    }
    navigate(&state, uri.path()).await
}

/// POST /signup
pub async fn submit_signup(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SignUpForm>,
) -> Result<Redirect, AppError> {
    let result = state
        .auth
        .sign_up(&form.email, &form.password, &form.confirm);
    finish_auth_action(&state, result, Route::SignUp)
}

/// POST /login
pub async fn submit_login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SignInForm>,
) -> Result<Redirect, AppError> {
    let result = state.auth.sign_in(&form.email, &form.password);
    finish_auth_action(&state, result, Route::SignIn)
}

/// POST /logout
pub async fn submit_logout(State(state): State<Arc<AppState>>) -> Result<Redirect, AppError> {
    let result = state.auth.logout();
    finish_auth_action(&state, result, Route::SignIn)
}

/// GET /assets/chat.js - chat panel behaviour (inline scripts are blocked by CSP)
pub async fn chat_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        CHAT_SCRIPT,
    )
}
