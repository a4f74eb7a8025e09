//! SmartExpense Web Server
//!
//! Axum-based web surface for the SmartExpense prototype.
//!
//! - Server-rendered sign-up, sign-in and dashboard pages
//! - Form posts that redirect (303) and leave a one-shot notice for the next page
//! - JSON chat API backed by in-memory conversations, guarded by the session
//! - Restrictive CORS policy and security headers
//!
//! The session is the single credential slot of the shared storage backend,
//! so every client of one server sees the same login state.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{debug, error, info};

use smartexpense_core::{AuthError, AuthGate, ChatBot, Error as CoreError, Notice};

mod handlers;
mod views;

pub use handlers::ConversationManager;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub auth: AuthGate,
    pub bot: ChatBot,
    pub config: ServerConfig,
    /// Open chat views, keyed by conversation ID
    pub conversations: ConversationManager,
    /// Notice waiting to be shown by the next rendered page
    flash: Mutex<Option<Notice>>,
}

impl AppState {
    pub fn new(auth: AuthGate, bot: ChatBot, config: ServerConfig) -> Self {
        Self {
            auth,
            bot,
            config,
            conversations: ConversationManager::new(),
            flash: Mutex::new(None),
        }
    }

    /// Queue a notice for the next page render, replacing any unshown one
    pub fn set_notice(&self, notice: Notice) {
        if let Ok(mut slot) = self.flash.lock() {
            *slot = Some(notice);
        }
    }

    /// Take the queued notice, if any
    pub fn take_notice(&self) -> Option<Notice> {
        self.flash.lock().ok().and_then(|mut slot| slot.take())
    }
}

/// Session guard for the chat API
///
/// Re-reads the credential slot on every request.
async fn session_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    match state.auth.require_session() {
        Ok(user) => {
            debug!(user = %user.email, path = %request.uri().path(), "Session present");
            next.run(request).await
        }
        Err(CoreError::Auth(AuthError::NoActiveSession)) => {
            info!(path = %request.uri().path(), "Rejected chat request without a session");
            AppError::unauthorized("Authentication required").into_response()
        }
        Err(e) => AppError::from(e).into_response(),
    }
}

/// Create the application router
pub fn create_router(auth: AuthGate, bot: ChatBot, config: ServerConfig) -> Router {
    let state = Arc::new(AppState::new(auth, bot, config));
    create_router_with_state(state)
}

/// Create the router around existing state (tests inspect the state afterwards)
pub fn create_router_with_state(state: Arc<AppState>) -> Router {
    info!(
        backend = state.auth.store().backend_name(),
        delay_ms = state.bot.delay().as_millis() as u64,
        rules = state.bot.engine().rules().len(),
        "Building router"
    );

    let chat_routes = Router::new()
        .route("/chat", post(handlers::post_chat))
        .route(
            "/chat/:id",
            get(handlers::get_chat).delete(handlers::delete_chat),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    let api_routes = Router::new()
        .route("/session", get(handlers::get_session))
        .route("/rules", get(handlers::list_rules))
        .merge(chat_routes);

    let page_routes = Router::new()
        .route("/", get(handlers::landing))
        .route(
            "/signup",
            get(handlers::signup_page).post(handlers::submit_signup),
        )
        .route("/login", get(handlers::login_page).post(handlers::submit_login))
        .route("/logout", post(handlers::submit_logout))
        .route("/dashboard", get(handlers::dashboard_page))
        .route("/dashboard/*rest", get(handlers::dashboard_page))
        .route("/assets/chat.js", get(handlers::chat_script));

    // Build CORS layer
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];
    let cors = if state.config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    };

    // CSP: scripts only from our own origin, inline styles for the page chrome
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; connect-src 'self'; form-action 'self'; frame-ancestors 'none'"
    );

    Router::new()
        .merge(page_routes)
        .nest("/api", api_routes)
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("same-origin"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ))
}

/// Start the server
pub async fn serve(auth: AuthGate, bot: ChatBot, host: &str, port: u16) -> anyhow::Result<()> {
    serve_with_config(auth, bot, host, port, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    auth: AuthGate,
    bot: ChatBot,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    match auth.require_session() {
        Ok(user) => info!(user = %user.email, "Existing session found in storage"),
        Err(CoreError::Auth(AuthError::NoActiveSession)) => info!("No active session"),
        Err(e) => return Err(e.into()),
    }

    let app = create_router(auth, bot, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    fn with_status(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn bad_request(msg: &str) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, msg)
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self::with_status(StatusCode::UNAUTHORIZED, msg)
    }

    pub fn not_found(msg: &str) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, msg)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;
