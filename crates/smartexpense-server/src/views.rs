//! HTML rendering for the server-side pages
//!
//! Plain `format!` templates. Every dynamic value goes through `escape`.

use smartexpense_core::dashboard::{APP_NAME, BOT_NAME, BOT_TAGLINE};
use smartexpense_core::{DashboardView, Notice, WELCOME_MESSAGE};

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:0;background:#f5f7fb;color:#1f2937}\
main{max-width:960px;margin:0 auto;padding:24px}\
header{display:flex;justify-content:space-between;align-items:center}\
.card{background:#fff;border-radius:8px;padding:16px;margin:12px 0;box-shadow:0 1px 3px #0002}\
.features{display:grid;grid-template-columns:repeat(auto-fit,minmax(220px,1fr));gap:12px}\
.notice{padding:10px 14px;border-radius:6px;margin-bottom:12px}\
.notice-success{background:#dcfce7}.notice-error{background:#fee2e2}\
form.auth{display:flex;flex-direction:column;gap:8px;max-width:320px}\
#chat-log{list-style:none;padding:0;max-height:320px;overflow-y:auto}\
#chat-log .user{text-align:right}\
.quick{margin-right:6px}";

/// Escape text for use in HTML content and quoted attributes
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn notice_html(notice: Option<&Notice>) -> String {
    match notice {
        Some(n) => format!(
            r#"<div class="notice notice-{}" role="status">{}</div>"#,
            n.level.as_str(),
            escape(&n.message)
        ),
        None => String::new(),
    }
}

fn layout(title: &str, notice: Option<&Notice>, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | {app}</title>
<style>{style}</style>
</head>
<body>
<main>
{notice}
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
        app = APP_NAME,
        style = STYLE,
        notice = notice_html(notice),
        body = body,
    )
}

pub fn signup_page(notice: Option<&Notice>) -> String {
    let body = format!(
        r#"<h1>Create your {app} account</h1>
<form class="auth" method="post" action="/signup">
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<label>Confirm password <input type="password" name="confirm" required></label>
<button type="submit">Sign up</button>
</form>
<p>Already have an account? <a href="/login">Log in</a></p>"#,
        app = APP_NAME
    );
    layout("Sign up", notice, &body)
}

pub fn login_page(notice: Option<&Notice>) -> String {
    let body = format!(
        r#"<h1>Log in to {app}</h1>
<form class="auth" method="post" action="/login">
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Log in</button>
</form>
<p>No account yet? <a href="/signup">Sign up</a></p>"#,
        app = APP_NAME
    );
    layout("Log in", notice, &body)
}

pub fn dashboard_page(view: &DashboardView, chat_id: &str, notice: Option<&Notice>) -> String {
    let features: String = view
        .features
        .iter()
        .map(|f| {
            format!(
                r#"<div class="card"><h3>{}</h3><p>{}</p></div>"#,
                escape(f.title),
                escape(f.description)
            )
        })
        .collect();

    let quick_replies: String = view
        .quick_replies
        .iter()
        .map(|q| {
            format!(
                r#"<button type="button" class="quick" data-text="{q}">{q}</button>"#,
                q = escape(q)
            )
        })
        .collect();

    let body = format!(
        r#"<header>
<h1>{title}</h1>
<div><span id="user-email">{email}</span>
<form method="post" action="/logout" style="display:inline"><button type="submit">Logout</button></form></div>
</header>
<section class="card"><h2>Overview</h2><p>{overview}</p></section>
<section class="features">{features}</section>
<section class="card" id="chat" data-session-id="{chat_id}">
<h2>{bot}</h2>
<p>{tagline}</p>
<ul id="chat-log"><li class="bot">{welcome}</li></ul>
<p id="chat-typing" hidden>Typing...</p>
<div>{quick_replies}</div>
<form id="chat-form">
<input type="text" name="message" autocomplete="off" placeholder="Ask {bot}...">
<button type="submit">Send</button>
</form>
</section>
<script src="/assets/chat.js" defer></script>"#,
        title = escape(view.title),
        email = escape(&view.email),
        overview = escape(view.overview),
        features = features,
        bot = escape(BOT_NAME),
        tagline = escape(BOT_TAGLINE),
        welcome = escape(WELCOME_MESSAGE),
        quick_replies = quick_replies,
        chat_id = escape(chat_id),
    );
    layout(view.title, notice, &body)
}
