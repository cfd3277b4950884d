//! Server-side sessions and the extractor that resolves them.

use super::state::{lock, ServerState};
use super::ApiError;
use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;
use log::debug;
use rand::{distributions::Alphanumeric, Rng};
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const COOKIE_SESSION_TOKEN_KEY: &str = "session_token";
pub const HEADER_SESSION_TOKEN_KEY: &str = "Authorization";

const TOKEN_LENGTH: usize = 32;
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Random alphanumeric token, used for sessions and OAuth state.
pub fn random_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// The logged-in user of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub username: String,
    /// Music API access token obtained at login
    pub access_token: String,
}

#[derive(Debug)]
struct SessionRecord {
    username: String,
    access_token: String,
    last_seen: Instant,
}

impl SessionRecord {
    fn is_idle(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_seen) > timeout
    }
}

/// In-memory sessions that expire after a period of inactivity.
#[derive(Debug)]
pub struct SessionManager {
    sessions: HashMap<String, SessionRecord>,
    idle_timeout: Duration,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            idle_timeout,
        }
    }

    /// Open a session and return its token. Idle sessions are pruned first.
    pub fn open(&mut self, username: &str, access_token: &str) -> String {
        self.open_at(username, access_token, Instant::now())
    }

    fn open_at(&mut self, username: &str, access_token: &str, now: Instant) -> String {
        self.prune(now);
        let token = random_token();
        self.sessions.insert(
            token.clone(),
            SessionRecord {
                username: username.to_owned(),
                access_token: access_token.to_owned(),
                last_seen: now,
            },
        );
        debug!("Opened session for {username}");
        token
    }

    /// Resolve a token, refreshing its last use.
    pub fn get(&mut self, token: &str) -> Option<Session> {
        self.get_at(token, Instant::now())
    }

    fn get_at(&mut self, token: &str, now: Instant) -> Option<Session> {
        let timeout = self.idle_timeout;
        if self.sessions.get(token)?.is_idle(now, timeout) {
            self.sessions.remove(token);
            debug!("Session expired");
            return None;
        }
        let record = self.sessions.get_mut(token)?;
        record.last_seen = now;
        Some(Session {
            token: token.to_owned(),
            username: record.username.clone(),
            access_token: record.access_token.clone(),
        })
    }

    fn prune(&mut self, now: Instant) {
        let timeout = self.idle_timeout;
        let before = self.sessions.len();
        self.sessions.retain(|_, record| !record.is_idle(now, timeout));
        let expired = before - self.sessions.len();
        if expired > 0 {
            debug!("Pruned {expired} idle sessions");
        }
    }

    /// Returns whether a session was closed.
    pub fn close(&mut self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

fn extract_session_token_from_cookies(parts: &Parts) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(COOKIE_SESSION_TOKEN_KEY)
        .map(|cookie| cookie.value().to_owned())
}

fn extract_session_token_from_headers(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(HEADER_SESSION_TOKEN_KEY)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then(|| token.to_owned())
}

fn extract_session(parts: &Parts, ctx: &ServerState) -> Result<Option<Session>, ApiError> {
    let Some(token) = extract_session_token_from_cookies(parts)
        .or_else(|| extract_session_token_from_headers(parts))
    else {
        debug!("No token in cookies nor headers.");
        return Ok(None);
    };

    let session = lock(&ctx.sessions)?.get(&token);
    if session.is_none() {
        debug!("Unknown session token");
    }
    Ok(session)
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        extract_session(parts, ctx)?.ok_or(ApiError::Unauthorized)
    }
}

impl OptionalFromRequestParts<ServerState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Option<Self>, Self::Rejection> {
        extract_session(parts, ctx)
    }
}
