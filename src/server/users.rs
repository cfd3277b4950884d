//! Dashboard, user pages, the follow graph and direct messages.

use super::session::Session;
use super::state::{lock, ServerState};
use super::{path_segment, ApiError};
use crate::music_api;
use crate::profile::UserProfile;
use crate::similarity::SimilarityResult;
use crate::social::Message;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
    Form, Json,
};
use log::{debug, error};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct SimilarUser {
    pub username: String,
    pub score: f64,
    pub percent: f64,
}

impl From<SimilarityResult> for SimilarUser {
    fn from(result: SimilarityResult) -> Self {
        SimilarUser {
            percent: result.percent(),
            username: result.username,
            score: result.score,
        }
    }
}

#[derive(Serialize)]
struct Dashboard {
    profile: UserProfile,
    similar_users: Vec<SimilarUser>,
}

#[derive(Serialize)]
struct UserPage {
    profile: UserProfile,
    is_following: bool,
    followers: Vec<String>,
    following: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct MessageForm {
    content: String,
}

/// Similar users of `username`, served from the snapshot cache.
fn similar_users(state: &ServerState, username: &str) -> Result<Vec<SimilarUser>, ApiError> {
    let profiles = lock(&state.profiles)?;
    let results = lock(&state.similarity)?
        .results_for(username, &profiles)
        .ok_or_else(|| ApiError::user_not_found(username))?;
    Ok(results.into_iter().map(SimilarUser::from).collect())
}

fn ensure_user_exists(state: &ServerState, username: &str) -> Result<(), ApiError> {
    if lock(&state.profiles)?.contains(username) {
        Ok(())
    } else {
        Err(ApiError::user_not_found(username))
    }
}

fn user_location(username: &str) -> String {
    format!("/users/{}", path_segment(username))
}

/// Fetch the live profile, store it and recompute every user's similar users.
pub async fn dashboard(
    State(state): State<ServerState>,
    session: Session,
) -> Result<impl IntoResponse, ApiError> {
    let profile = music_api::fetch_profile(state.music_api.as_ref(), &session.access_token).await?;
    let username = profile.username.clone();

    let similar_users = {
        let mut profiles = lock(&state.profiles)?;
        profiles.insert(profile.clone());

        let mut similarity = lock(&state.similarity)?;
        if let Err(err) = similarity.refresh(&profiles) {
            error!("Failed to persist similarity snapshot: {err:#}");
        }
        similarity
            .results_for(&username, &profiles)
            .unwrap_or_default()
    };
    debug!("{username} has {} similar users", similar_users.len());

    Ok(Json(Dashboard {
        profile,
        similar_users: similar_users.into_iter().map(SimilarUser::from).collect(),
    }))
}

pub async fn get_user(
    State(state): State<ServerState>,
    session: Session,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = lock(&state.profiles)?
        .get(&username)
        .cloned()
        .ok_or_else(|| ApiError::user_not_found(&username))?;

    let social = lock(&state.social)?;
    Ok(Json(UserPage {
        profile,
        is_following: social.is_following(&session.username, &username),
        followers: social.followers(&username),
        following: social.following(&username),
    }))
}

pub async fn get_similar(
    State(state): State<ServerState>,
    _session: Session,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(similar_users(&state, &username)?))
}

pub async fn follow(
    State(state): State<ServerState>,
    session: Session,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_user_exists(&state, &username)?;
    lock(&state.social)?.follow(&session.username, &username)?;
    Ok(Redirect::to(&user_location(&username)))
}

pub async fn unfollow(
    State(state): State<ServerState>,
    session: Session,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_user_exists(&state, &username)?;
    lock(&state.social)?.unfollow(&session.username, &username)?;
    Ok(Redirect::to(&user_location(&username)))
}

pub async fn get_messages(
    State(state): State<ServerState>,
    session: Session,
) -> Result<Json<Vec<Message>>, ApiError> {
    Ok(Json(lock(&state.social)?.inbox(&session.username).to_vec()))
}

pub async fn send_message(
    State(state): State<ServerState>,
    session: Session,
    Path(username): Path<String>,
    Form(form): Form<MessageForm>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_user_exists(&state, &username)?;
    lock(&state.social)?.send_message(&session.username, &username, &form.content)?;
    Ok(Redirect::to(&user_location(&username)))
}
