//! Navigation: path → route mapping and redirect rules
//!
//! Resolution is a pure function of the requested route and whether a
//! session is present. Callers re-check the session on every navigation.

use serde::Serialize;

/// The application's views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// `/`: bounces to the dashboard or to sign-in
    Landing,
    SignUp,
    SignIn,
    /// Protected view
    Dashboard,
    /// Anything unrecognised
    NotFound,
}

impl Route {
    /// Canonical path. `NotFound` has none and reports the catch-all pattern.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::SignUp => "/signup",
            Self::SignIn => "/login",
            Self::Dashboard => "/dashboard",
            Self::NotFound => "*",
        }
    }

    /// Map a request path (query string and trailing slash ignored)
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let trimmed = path.trim_end_matches('/');

        match trimmed {
            "" => Self::Landing,
            "/signup" => Self::SignUp,
            "/login" => Self::SignIn,
            "/dashboard" => Self::Dashboard,
            p if p.starts_with("/dashboard/") => Self::Dashboard,
            _ => Self::NotFound,
        }
    }

    /// Whether rendering requires a session
    pub fn is_protected(&self) -> bool {
        matches!(self, Self::Dashboard)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// What to do for a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Show this view
    Render(Route),
    /// Replace the location with this route
    Redirect(Route),
}

/// Decide what a navigation to `route` should do
pub fn resolve(route: Route, session_present: bool) -> Navigation {
    match route {
        Route::Landing if session_present => Navigation::Redirect(Route::Dashboard),
        Route::Landing => Navigation::Redirect(Route::SignIn),
        Route::SignUp | Route::SignIn => Navigation::Render(route),
        Route::Dashboard if session_present => Navigation::Render(Route::Dashboard),
        Route::Dashboard => Navigation::Redirect(Route::SignIn),
        Route::NotFound => Navigation::Redirect(Route::Landing),
    }
}
