//! Session-based authorization guard. The router performs the capability
//! check before any mutating handler runs; handlers and the query engine
//! never see identity.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use uuid::Uuid;

use super::AppState;
use super::error::ApiError;
use crate::config::Credentials;

pub const SESSION_COOKIE: &str = "taskdeck_session";

/// Capability check collaborator for mutating routes.
pub trait AuthGuard: Send + Sync {
    /// Is the bearer of `token` allowed to mutate?
    fn authorize(&self, token: Option<&str>) -> bool;

    /// Check credentials and mint a session token.
    fn login(&self, username: &str, password: &str) -> Option<String>;

    fn logout(&self, token: &str);
}

/// Production guard: configured credentials plus the set of live session
/// tokens. Sessions live in memory and end with the process.
pub struct SessionGuard {
    credentials: Credentials,
    sessions: RwLock<HashSet<String>>,
}

impl SessionGuard {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            sessions: RwLock::new(HashSet::new()),
        }
    }
}

impl AuthGuard for SessionGuard {
    fn authorize(&self, token: Option<&str>) -> bool {
        let Some(token) = token else {
            return false;
        };
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(token)
    }

    fn login(&self, username: &str, password: &str) -> Option<String> {
        if username != self.credentials.username || password != self.credentials.password {
            return None;
        }
        let token = Uuid::new_v4().to_string();
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.clone());
        Some(token)
    }

    fn logout(&self, token: &str) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token);
    }
}

/// Pull the session token out of the Cookie header, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Max-Age=0")
}

/// Router middleware wrapping every mutating route: browsers get sent to
/// the login page, API callers get a 401 body.
pub async fn require_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let token = session_token(request.headers());
    if state.guard.authorize(token.as_deref()) {
        return next.run(request).await;
    }

    if request.uri().path().starts_with("/api/") {
        ApiError::Unauthorized.into_response()
    } else {
        Redirect::to("/login").into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn guard() -> SessionGuard {
        SessionGuard::new(Credentials {
            username: "alice".to_string(),
            password: "hunter2".to_string(),
        })
    }

    #[test]
    fn login_with_good_credentials_mints_a_token() {
        let guard = guard();
        let token = guard.login("alice", "hunter2").unwrap();
        assert!(guard.authorize(Some(&token)));
    }

    #[test]
    fn login_rejects_bad_credentials() {
        let guard = guard();
        assert!(guard.login("alice", "wrong").is_none());
        assert!(guard.login("bob", "hunter2").is_none());
    }

    #[test]
    fn unknown_or_absent_tokens_are_refused() {
        let guard = guard();
        assert!(!guard.authorize(None));
        assert!(!guard.authorize(Some("made-up")));
    }

    #[test]
    fn logout_invalidates_the_token() {
        let guard = guard();
        let token = guard.login("alice", "hunter2").unwrap();
        guard.logout(&token);
        assert!(!guard.authorize(Some(&token)));
    }

    #[test]
    fn tokens_are_unique_per_login() {
        let guard = guard();
        let first = guard.login("alice", "hunter2").unwrap();
        let second = guard.login("alice", "hunter2").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn session_token_is_found_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; taskdeck_session=abc123; lang=en"),
        );
        assert_eq!(session_token(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn session_token_absent_without_cookie_header() {
        assert_eq!(session_token(&HeaderMap::new()), None);
    }
}
