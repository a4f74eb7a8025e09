//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use smartexpense_core::{
    reply::HELP_REPLY, Credential, MemoryStorage, ReplyEngine, SessionStore, StorageBackend,
};
use std::time::Duration;
use tower::ServiceExt;

fn setup_test_state_with_delay(delay: Duration) -> Arc<AppState> {
    let auth = AuthGate::new(SessionStore::new(Arc::new(MemoryStorage::new())));
    let bot = ChatBot::new(ReplyEngine::new(), delay);
    Arc::new(AppState::new(auth, bot, ServerConfig::default()))
}

fn setup_test_app() -> (Router, Arc<AppState>) {
    let state = setup_test_state_with_delay(Duration::ZERO);
    (create_router_with_state(state.clone()), state)
}

fn setup_logged_in_app() -> (Router, Arc<AppState>) {
    let (app, state) = setup_test_app();
    state
        .auth
        .store()
        .save(&Credential::new("ana@example.com", "pw"))
        .unwrap();
    (app, state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

async fn get_body_json(response: Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get_body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ========== Navigation Tests ==========

#[tokio::test]
async fn test_landing_without_session_redirects_to_login() {
    let (app, _) = setup_test_app();

    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_landing_with_session_redirects_to_dashboard() {
    let (app, _) = setup_logged_in_app();

    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn test_dashboard_is_guarded() {
    let (app, _) = setup_test_app();

    for uri in ["/dashboard", "/dashboard/reports"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }
}

#[tokio::test]
async fn test_unknown_page_redirects_to_landing() {
    let (app, _) = setup_test_app();

    let response = app.oneshot(get("/no/such/page")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_unknown_api_path_is_json_404() {
    let (app, _) = setup_test_app();

    let response = app.oneshot(get("/api/nope")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Not found");
}

#[tokio::test]
async fn test_auth_pages_render() {
    let (app, _) = setup_test_app();

    let response = app.clone().oneshot(get("/signup")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = get_body_text(response).await;
    assert!(html.contains(r#"action="/signup""#));
    assert!(html.contains(r#"name="confirm""#));

    let response = app.oneshot(get("/login")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = get_body_text(response).await;
    assert!(html.contains(r#"action="/login""#));
}

// ========== Auth Form Tests ==========

#[tokio::test]
async fn test_signup_then_login_flow() {
    let (app, state) = setup_test_app();

    let response = app
        .clone()
        .oneshot(form_post(
            "/signup",
            "email=ana%40example.com&password=s3cret&confirm=s3cret",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    // Notice shows once on the next page
    let html = get_body_text(app.clone().oneshot(get("/login")).await.unwrap()).await;
    assert!(html.contains("Account created!"));
    let html = get_body_text(app.clone().oneshot(get("/login")).await.unwrap()).await;
    assert!(!html.contains("Account created!"));

    let response = app
        .clone()
        .oneshot(form_post(
            "/login",
            "email=ana%40example.com&password=s3cret",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");

    let response = app.oneshot(get("/dashboard")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = get_body_text(response).await;
    assert!(html.contains("Login successful!"));
    assert!(html.contains("ana@example.com"));
    assert!(html.contains("ExpenseBot"));
    assert!(!html.contains("s3cret"));

    assert!(state.auth.store().is_active().unwrap());
}

#[tokio::test]
async fn test_signup_password_mismatch() {
    let (app, state) = setup_test_app();

    let response = app
        .clone()
        .oneshot(form_post(
            "/signup",
            "email=ana%40example.com&password=one&confirm=two",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/signup");
    assert!(!state.auth.store().is_active().unwrap());

    let html = get_body_text(app.oneshot(get("/signup")).await.unwrap()).await;
    assert!(html.contains("Passwords do not match"));
}

#[tokio::test]
async fn test_signup_missing_fields() {
    let (app, state) = setup_test_app();

    let response = app
        .clone()
        .oneshot(form_post("/signup", "password=pw&confirm=pw"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/signup");
    assert!(!state.auth.store().is_active().unwrap());

    let html = get_body_text(app.oneshot(get("/signup")).await.unwrap()).await;
    assert!(html.contains("Email is required"));
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let (app, state) = setup_logged_in_app();

    let response = app
        .clone()
        .oneshot(form_post(
            "/login",
            "email=ana%40example.com&password=wrong",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let html = get_body_text(app.oneshot(get("/login")).await.unwrap()).await;
    assert!(html.contains("Invalid credentials"));

    // Stored record untouched
    let stored = state.auth.store().load().unwrap().unwrap();
    assert_eq!(stored.password, "pw");
}

#[tokio::test]
async fn test_logout_clears_session() {
    let (app, state) = setup_logged_in_app();

    let response = app
        .clone()
        .oneshot(form_post("/logout", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert!(!state.auth.store().is_active().unwrap());

    let response = app.clone().oneshot(get("/dashboard")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    // The redirect did not consume the notice
    let html = get_body_text(app.oneshot(get("/login")).await.unwrap()).await;
    assert!(html.contains("Logged out"));
}

// ========== Session API Tests ==========

#[tokio::test]
async fn test_session_endpoint() {
    let (app, state) = setup_test_app();

    let json = get_body_json(app.clone().oneshot(get("/api/session")).await.unwrap()).await;
    assert_eq!(json["logged_in"], false);
    assert!(json["email"].is_null());

    state
        .auth
        .store()
        .save(&Credential::new("ana@example.com", "pw"))
        .unwrap();

    let json = get_body_json(app.oneshot(get("/api/session")).await.unwrap()).await;
    assert_eq!(json["logged_in"], true);
    assert_eq!(json["email"], "ana@example.com");
    assert!(json.get("password").is_none());
}

#[tokio::test]
async fn test_session_endpoint_with_corrupt_record() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set("user", "not json").unwrap();
    let auth = AuthGate::new(SessionStore::new(storage));
    let app = create_router(auth, ChatBot::default(), ServerConfig::default());

    let json = get_body_json(app.oneshot(get("/api/session")).await.unwrap()).await;
    assert_eq!(json["logged_in"], false);
}

// ========== Chat API Tests ==========

#[tokio::test]
async fn test_chat_requires_session() {
    let (app, _) = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/chat",
            serde_json::json!({ "message": "help" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Authentication required");
}

#[tokio::test]
async fn test_chat_conversation() {
    let (app, state) = setup_logged_in_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/chat",
            serde_json::json!({ "message": "help" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let session_id = json["session_id"].as_str().unwrap().to_string();
    assert_eq!(json["delivered"], true);
    assert_eq!(json["reply"], HELP_REPLY);

    let messages = json["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0]["sender"], "bot");
    assert_eq!(messages[1]["sender"], "user");
    assert_eq!(messages[1]["text"], "help");
    assert_eq!(messages[2]["sender"], "bot");

    // Continue the same conversation
    let json = get_body_json(
        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/chat",
                serde_json::json!({ "message": "add expense 250", "session_id": session_id }),
            ))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(json["session_id"], session_id.as_str());
    assert!(json["reply"].as_str().unwrap().contains("250"));
    assert_eq!(json["messages"].as_array().unwrap().len(), 5);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/chat/{}", session_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["thinking"], false);
    assert_eq!(json["messages"].as_array().unwrap().len(), 5);

    // Teardown
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/chat/{}", session_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["deleted"], true);

    let response = app
        .oneshot(get(&format!("/api/chat/{}", session_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(state.conversations.count().await, 0);
}

#[tokio::test]
async fn test_chat_blank_message() {
    let (app, state) = setup_logged_in_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/chat",
            serde_json::json!({ "message": "   " }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(state.conversations.count().await, 0);
}

#[tokio::test]
async fn test_chat_unknown_conversation() {
    let (app, _) = setup_logged_in_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/chat",
            serde_json::json!({ "message": "help", "session_id": "chat_missing" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

fn embedded_chat_id(html: &str) -> String {
    let start = html.find(r#"data-session-id=""#).unwrap() + r#"data-session-id=""#.len();
    let len = html[start..].find('"').unwrap();
    html[start..start + len].to_string()
}

#[tokio::test]
async fn test_dashboard_opens_one_conversation_for_quick_sends() {
    let state = setup_test_state_with_delay(Duration::from_millis(200));
    state
        .auth
        .store()
        .save(&Credential::new("ana@example.com", "pw"))
        .unwrap();
    let app = create_router_with_state(state.clone());

    let response = app.clone().oneshot(get("/dashboard")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let session_id = embedded_chat_id(&get_body_text(response).await);
    assert!(session_id.starts_with("chat_"));
    assert_eq!(state.conversations.count().await, 1);

    // Two quick replies sent before the first answer arrives
    let send = |message: &str| {
        app.clone().oneshot(json_request(
            "POST",
            "/api/chat",
            serde_json::json!({ "message": message, "session_id": session_id }),
        ))
    };
    let (first, second) = tokio::join!(send("help"), send("summary"));
    let first = get_body_json(first.unwrap()).await;
    let second = get_body_json(second.unwrap()).await;

    assert_eq!(first["session_id"], session_id.as_str());
    assert_eq!(second["session_id"], session_id.as_str());
    assert_eq!(state.conversations.count().await, 1);

    let snapshot = state.conversations.snapshot(&session_id).await.unwrap();
    let texts: Vec<&str> = snapshot.messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts.len(), 5);
    assert!(texts.contains(&"help"));
    assert!(texts.contains(&"summary"));
    assert!(texts.contains(&HELP_REPLY));
    assert!(!snapshot.thinking);
}

#[tokio::test(start_paused = true)]
async fn test_chat_expired_conversation() {
    let (app, state) = setup_logged_in_app();
    let expired = state.conversations.create().await;

    tokio::time::advance(handlers::CONVERSATION_TIMEOUT + Duration::from_secs(1)).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/chat",
            serde_json::json!({ "message": "help", "session_id": expired }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(get(&format!("/api/chat/{}", expired)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The next conversation sweeps the expired one
    state.conversations.create().await;
    assert_eq!(state.conversations.count().await, 1);
}

#[tokio::test]
async fn test_chat_teardown_drops_late_reply() {
    let state = setup_test_state_with_delay(Duration::from_millis(500));
    state
        .auth
        .store()
        .save(&Credential::new("ana@example.com", "pw"))
        .unwrap();
    let app = create_router_with_state(state.clone());
    let session_id = state.conversations.create().await;

    let request = json_request(
        "POST",
        "/api/chat",
        serde_json::json!({ "message": "summary", "session_id": session_id }),
    );
    let pending = tokio::spawn(app.oneshot(request));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(state.conversations.close(&session_id).await, Some(1));

    let response = pending.await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["delivered"], false);
    assert!(json.get("reply").is_none());
}

// ========== Rules & Assets ==========

#[tokio::test]
async fn test_list_rules() {
    let (app, _) = setup_test_app();

    let response = app.oneshot(get("/api/rules")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let rules = json.as_array().unwrap();
    let kinds: Vec<&str> = rules.iter().map(|r| r["kind"].as_str().unwrap()).collect();
    assert_eq!(
        kinds,
        vec!["help", "categories", "summary", "greeting", "add-expense"]
    );
    assert!(rules.iter().all(|r| r["enabled"] == true));
}

#[tokio::test]
async fn test_chat_script_served() {
    let (app, _) = setup_test_app();

    let response = app.oneshot(get("/assets/chat.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/javascript; charset=utf-8"
    );
    let script = get_body_text(response).await;
    assert!(script.contains("/api/chat"));
    assert!(script.contains("data-session-id"));
}

#[tokio::test]
async fn test_security_headers() {
    let (app, _) = setup_test_app();

    let response = app.oneshot(get("/login")).await.unwrap();
    let headers = response.headers();

    assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
    assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
    let csp = headers
        .get(header::CONTENT_SECURITY_POLICY)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(csp.contains("script-src 'self'"));
    assert!(csp.contains("frame-ancestors 'none'"));
}

// ========== Shared Storage ==========

#[tokio::test]
async fn test_routers_share_file_backed_session() {
    use smartexpense_core::FileStorage;
    use tempfile::TempDir;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("storage.json");
    let open_app = || {
        let storage = Arc::new(FileStorage::new(&path).unwrap());
        let auth = AuthGate::new(SessionStore::new(storage));
        create_router(auth, ChatBot::default(), ServerConfig::default())
    };
    let first = open_app();
    let second = open_app();

    first
        .clone()
        .oneshot(form_post("/signup", "email=a%40b.io&password=pw&confirm=pw"))
        .await
        .unwrap();

    let response = second.clone().oneshot(get("/dashboard")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Logout in one is seen by the other on its next navigation
    second.oneshot(form_post("/logout", "")).await.unwrap();
    let response = first.oneshot(get("/dashboard")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}
