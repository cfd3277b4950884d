//! OAuth login against the music API.

use super::session::{random_token, Session, COOKIE_SESSION_TOKEN_KEY};
use super::state::{lock, ServerState};
use super::ApiError;
use crate::music_api;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use log::info;
use serde::Deserialize;

pub const COOKIE_OAUTH_STATE_KEY: &str = "oauth_state";

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub async fn login(State(state): State<ServerState>, jar: CookieJar) -> impl IntoResponse {
    let oauth_state = random_token();
    let url = state.music_api.authorize_url(&oauth_state);
    let jar = jar.add(session_cookie(COOKIE_OAUTH_STATE_KEY, oauth_state));
    (jar, Redirect::to(&url))
}

pub async fn callback(
    State(state): State<ServerState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(error) = query.error {
        return Err(ApiError::BadRequest(format!("Authorization denied: {error}")));
    }

    let expected = jar.get(COOKIE_OAUTH_STATE_KEY).map(|c| c.value().to_owned());
    if expected.is_none() || expected != query.state {
        return Err(ApiError::BadRequest("OAuth state mismatch".to_owned()));
    }
    let code = query
        .code
        .ok_or_else(|| ApiError::BadRequest("Missing authorization code".to_owned()))?;

    let token = state.music_api.exchange_code(&code).await?;
    let profile = music_api::fetch_profile(state.music_api.as_ref(), &token.access_token).await?;
    let username = profile.username.clone();

    lock(&state.profiles)?.insert(profile);
    let session_token = lock(&state.sessions)?.open(&username, &token.access_token);
    info!("{username} logged in");

    let jar = jar
        .remove(Cookie::build(COOKIE_OAUTH_STATE_KEY).path("/"))
        .add(session_cookie(COOKIE_SESSION_TOKEN_KEY, session_token));
    Ok((jar, Redirect::to("/dashboard")))
}

pub async fn logout(
    State(state): State<ServerState>,
    session: Option<Session>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(session) = session {
        lock(&state.sessions)?.close(&session.token);
        info!("{} logged out", session.username);
    }
    let jar = jar.remove(Cookie::build(COOKIE_SESSION_TOKEN_KEY).path("/"));
    Ok((jar, Redirect::to("/")))
}
