//! Authentication gate over the session store
//!
//! Not real authentication: credentials are stored in plain text in a single
//! slot and compared verbatim. Every failure leaves the store untouched.

use tracing::info;

use crate::error::{AuthError, Error, Result};
use crate::models::{Credential, Notice};
use crate::routes::{resolve, Navigation, Route};
use crate::session::SessionStore;

pub const NOTICE_ACCOUNT_CREATED: &str = "Account created!";
pub const NOTICE_LOGIN_OK: &str = "Login successful!";
pub const NOTICE_LOGGED_OUT: &str = "Logged out";

/// Result of a successful auth action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub notice: Notice,
    /// Where the UI should go next
    pub redirect: Route,
}

impl AuthError {
    /// Notice to show for this failure (`None` means fail silently)
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Self::NoActiveSession => None,
            other => Some(Notice::error(other.to_string())),
        }
    }

    /// Where the UI should go after this failure (`None` means stay put)
    pub fn redirect(&self) -> Option<Route> {
        match self {
            Self::NoActiveSession => Some(Route::SignIn),
            _ => None,
        }
    }
}

/// Sign-up, sign-in, logout and the route guard
#[derive(Clone)]
pub struct AuthGate {
    store: SessionStore,
}

impl AuthGate {
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Register the one credential record, replacing any previous one
    pub fn sign_up(&self, email: &str, password: &str, confirm: &str) -> Result<AuthOutcome> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::MissingField("Email").into());
        }
        if password.is_empty() {
            return Err(AuthError::MissingField("Password").into());
        }
        if password != confirm {
            return Err(AuthError::PasswordMismatch.into());
        }

        self.store.save(&Credential::new(email, password))?;
        info!(email = %email, "Account created");

        Ok(AuthOutcome {
            notice: Notice::success(NOTICE_ACCOUNT_CREATED),
            redirect: Route::SignIn,
        })
    }

    /// Compare against the stored record; both fields must match exactly
    pub fn sign_in(&self, email: &str, password: &str) -> Result<AuthOutcome> {
        let stored = self.store.load()?;

        match stored {
            Some(cred) if cred.matches(email, password) => {
                info!(email = %email, "Login successful");
                Ok(AuthOutcome {
                    notice: Notice::success(NOTICE_LOGIN_OK),
                    redirect: Route::Dashboard,
                })
            }
            _ => {
                info!(email = %email, "Login rejected");
                Err(AuthError::InvalidCredentials.into())
            }
        }
    }

    /// Drop the record
    pub fn logout(&self) -> Result<AuthOutcome> {
        self.store.clear()?;
        info!("Logged out");
        Ok(AuthOutcome {
            notice: Notice::success(NOTICE_LOGGED_OUT),
            redirect: Route::SignIn,
        })
    }

    /// Guard for protected views. Reads the store on every call.
    pub fn require_session(&self) -> Result<Credential> {
        self.store
            .load()?
            .ok_or(Error::Auth(AuthError::NoActiveSession))
    }

    /// Resolve a navigation against the current session state
    pub fn navigate(&self, path: &str) -> Result<Navigation> {
        let session_present = self.store.is_active()?;
        Ok(resolve(Route::from_path(path), session_present))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NoticeLevel;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    fn setup_gate() -> AuthGate {
        AuthGate::new(SessionStore::new(Arc::new(MemoryStorage::new())))
    }

    fn auth_err(result: Result<AuthOutcome>) -> AuthError {
        match result {
            Err(Error::Auth(e)) => e,
            Err(other) => panic!("unexpected error: {}", other),
            Ok(outcome) => panic!("unexpected success: {:?}", outcome),
        }
    }

    #[test]
    fn test_sign_up_then_sign_in() {
        let gate = setup_gate();

        let outcome = gate.sign_up("ana@example.com", "pw", "pw").unwrap();
        assert_eq!(outcome.redirect, Route::SignIn);
        assert_eq!(outcome.notice, Notice::success("Account created!"));

        let outcome = gate.sign_in("ana@example.com", "pw").unwrap();
        assert_eq!(outcome.redirect, Route::Dashboard);
        assert_eq!(outcome.notice.message, "Login successful!");
    }

    #[test]
    fn test_sign_in_wrong_email_or_password() {
        let gate = setup_gate();
        gate.sign_up("ana@example.com", "pw", "pw").unwrap();

        assert_eq!(
            auth_err(gate.sign_in("bob@example.com", "pw")),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            auth_err(gate.sign_in("ana@example.com", "PW")),
            AuthError::InvalidCredentials
        );
    }

    #[test]
    fn test_sign_in_without_record() {
        let gate = setup_gate();
        assert_eq!(
            auth_err(gate.sign_in("ana@example.com", "pw")),
            AuthError::InvalidCredentials
        );
    }

    #[test]
    fn test_password_mismatch_leaves_store_untouched() {
        let gate = setup_gate();
        assert_eq!(
            auth_err(gate.sign_up("ana@example.com", "pw", "other")),
            AuthError::PasswordMismatch
        );
        assert!(gate.store().load().unwrap().is_none());

        gate.sign_up("first@example.com", "a", "a").unwrap();
        let _ = gate.sign_up("second@example.com", "b", "c");
        assert_eq!(
            gate.store().load().unwrap().unwrap().email,
            "first@example.com"
        );
    }

    #[test]
    fn test_missing_fields() {
        let gate = setup_gate();
        assert_eq!(
            auth_err(gate.sign_up("  ", "pw", "pw")),
            AuthError::MissingField("Email")
        );
        assert_eq!(
            auth_err(gate.sign_up("a@b.com", "", "")),
            AuthError::MissingField("Password")
        );
        assert!(gate.store().load().unwrap().is_none());
    }

    #[test]
    fn test_email_is_trimmed() {
        let gate = setup_gate();
        gate.sign_up("  ana@example.com ", "pw", "pw").unwrap();
        assert_eq!(gate.store().load().unwrap().unwrap().email, "ana@example.com");
        assert!(gate.sign_in("ana@example.com", "pw").is_ok());
    }

    #[test]
    fn test_sign_in_email_is_not_trimmed() {
        let gate = setup_gate();
        gate.sign_up("ana@example.com", "pw", "pw").unwrap();

        assert_eq!(
            auth_err(gate.sign_in(" ana@example.com ", "pw")),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            auth_err(gate.sign_in("ana@example.com", " pw")),
            AuthError::InvalidCredentials
        );
    }

    #[test]
    fn test_repeat_sign_up_is_idempotent() {
        let once = setup_gate();
        once.sign_up("ana@example.com", "pw", "pw").unwrap();

        let twice = setup_gate();
        twice.sign_up("ana@example.com", "pw", "pw").unwrap();
        twice.sign_up("ana@example.com", "pw", "pw").unwrap();

        assert_eq!(once.store().load().unwrap(), twice.store().load().unwrap());
    }

    #[test]
    fn test_later_sign_up_replaces_account() {
        let gate = setup_gate();
        gate.sign_up("ana@example.com", "pw", "pw").unwrap();
        gate.sign_up("bob@example.com", "pw2", "pw2").unwrap();

        assert!(gate.sign_in("ana@example.com", "pw").is_err());
        assert!(gate.sign_in("bob@example.com", "pw2").is_ok());
    }

    #[test]
    fn test_logout_then_guard_redirects() {
        let gate = setup_gate();
        gate.sign_up("ana@example.com", "pw", "pw").unwrap();
        assert!(gate.require_session().is_ok());
        assert_eq!(
            gate.navigate("/dashboard").unwrap(),
            Navigation::Render(Route::Dashboard)
        );

        let outcome = gate.logout().unwrap();
        assert_eq!(outcome.notice.message, "Logged out");
        assert_eq!(outcome.redirect, Route::SignIn);

        assert!(matches!(
            gate.require_session(),
            Err(Error::Auth(AuthError::NoActiveSession))
        ));
        assert_eq!(
            gate.navigate("/dashboard").unwrap(),
            Navigation::Redirect(Route::SignIn)
        );
    }

    #[test]
    fn test_logout_without_session_still_redirects() {
        let gate = setup_gate();
        gate.logout().unwrap();
        assert_eq!(
            gate.navigate("/dashboard").unwrap(),
            Navigation::Redirect(Route::SignIn)
        );
    }

    #[test]
    fn test_error_notices() {
        let notice = AuthError::PasswordMismatch.notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Passwords do not match");

        assert_eq!(
            AuthError::InvalidCredentials.notice().unwrap().message,
            "Invalid credentials"
        );
        assert_eq!(
            AuthError::MissingField("Email").notice().unwrap().message,
            "Email is required"
        );
        assert!(AuthError::NoActiveSession.notice().is_none());
        assert_eq!(AuthError::NoActiveSession.redirect(), Some(Route::SignIn));
        assert_eq!(AuthError::InvalidCredentials.redirect(), None);
    }
}
