//! Admin session guard.
//!
//! A single configured admin identity logs in with username and password and
//! receives an opaque random token, stored client-side in an HTTP-only cookie.
//! Tokens live only in this process, so a restart signs the admin out.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use constant_time_eq::constant_time_eq;
use std::{
    collections::HashMap,
    convert::Infallible,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

use crate::{error::AppError, state::AppState};

/// Session cookie name.
pub const SESSION_COOKIE: &str = "admin_session";
/// Fixed session lifetime from issuance (8 hours).
pub const SESSION_TTL: Duration = Duration::from_secs(28_800);

/// The one admin identity, fixed at startup.
#[derive(Clone)]
pub struct AdminCredentials {
    username: String,
    password: String,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    fn matches(&self, username: &str, password: &str) -> bool {
        // Evaluate both halves so timing does not reveal which one was wrong.
        let user_ok = constant_time_eq(username.as_bytes(), self.username.as_bytes());
        let pass_ok = constant_time_eq(password.as_bytes(), self.password.as_bytes());
        user_ok & pass_ok
    }
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Outcome of checking a request's session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Admin,
    Anonymous,
}

impl Session {
    pub fn is_admin(self) -> bool {
        self == Session::Admin
    }
}

pub struct SessionGuard {
    credentials: AdminCredentials,
    /// Issued tokens and their issue time.
    sessions: RwLock<HashMap<String, Instant>>,
}

impl SessionGuard {
    pub fn new(credentials: AdminCredentials) -> Self {
        Self {
            credentials,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Check credentials and issue a fresh token on success.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String, AppError> {
        if username.is_empty() || password.is_empty() || !self.credentials.matches(username, password)
        {
            return Err(AppError::InvalidCredentials);
        }

        let token = new_session_token();
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, issued| now.saturating_duration_since(*issued) < SESSION_TTL);
        sessions.insert(token.clone(), now);
        Ok(token)
    }

    pub async fn validate(&self, token: &str) -> bool {
        self.validate_at(token, Instant::now()).await
    }

    async fn validate_at(&self, token: &str, now: Instant) -> bool {
        let issued = match self.sessions.read().await.get(token) {
            Some(issued) => *issued,
            None => return false,
        };
        if now.saturating_duration_since(issued) < SESSION_TTL {
            return true;
        }
        self.sessions.write().await.remove(token);
        false
    }

    pub async fn revoke(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }

    /// The only place a request's cookie is turned into a [`Session`].
    pub async fn session_from_headers(&self, headers: &HeaderMap) -> Session {
        // A browser may send a stale cookie alongside the current one.
        for token in extract_session_cookies(headers) {
            if self.validate(&token).await {
                return Session::Admin;
            }
        }
        Session::Anonymous
    }
}

// ── Extractors / middleware ───────────────────────────────────────────────────

impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(state.guard.session_from_headers(&parts.headers).await)
    }
}

/// Extractor for admin-only API handlers. Rejects with a 401 JSON body.
pub struct AdminSession;

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match Session::from_request_parts(parts, state).await {
            Ok(Session::Admin) => Ok(AdminSession),
            _ => Err(AppError::Unauthenticated),
        }
    }
}

/// Page-route gate: non-admins are sent to the login page.
pub async fn require_admin_page(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if state.guard.session_from_headers(req.headers()).await.is_admin() {
        return next.run(req).await;
    }
    Redirect::to("/admin/login").into_response()
}

// ── Cookie helpers ────────────────────────────────────────────────────────────

pub fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        SESSION_TTL.as_secs()
    )
}

pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Every non-empty `admin_session` value in the request, in header order.
pub fn extract_session_cookies(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .filter_map(|part| {
            part.trim()
                .strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
                .filter(|val| !val.is_empty())
                .map(str::to_string)
        })
        .collect()
}

fn new_session_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
