//! Playlist and recommendation calls passed through to the music API.

use super::session::Session;
use super::state::ServerState;
use super::{path_segment, ApiError};
use crate::music_api::{self, MusicApiError, RecommendationSeeds};
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
    Form, Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistForm {
    name: String,
}

#[derive(Debug, Deserialize)]
pub struct TrackForm {
    track_uri: String,
}

/// Comma separated seed lists, as the music API expects them.
#[derive(Debug, Default, Deserialize)]
pub struct RecommendationsQuery {
    #[serde(default)]
    seed_artists: Option<String>,
    #[serde(default)]
    seed_tracks: Option<String>,
    #[serde(default)]
    seed_genres: Option<String>,
    limit: Option<u32>,
}

fn split_seeds(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|seed| !seed.is_empty())
            .map(str::to_owned)
            .collect()
    })
    .unwrap_or_default()
}

impl RecommendationsQuery {
    fn seeds(&self) -> RecommendationSeeds {
        RecommendationSeeds {
            artists: split_seeds(self.seed_artists.as_deref()),
            tracks: split_seeds(self.seed_tracks.as_deref()),
            genres: split_seeds(self.seed_genres.as_deref()),
        }
    }
}

fn playlist_location(id: &str) -> String {
    format!("/playlists/{}", path_segment(id))
}

pub async fn get_playlist(
    State(state): State<ServerState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let playlist = state.music_api.playlist(&session.access_token, &id).await?;
    Ok(Json(playlist))
}

pub async fn create_playlist(
    State(state): State<ServerState>,
    session: Session,
    Form(form): Form<CreatePlaylistForm>,
) -> Result<impl IntoResponse, ApiError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Playlist name cannot be empty".to_owned()));
    }
    let created = state
        .music_api
        .create_playlist(&session.access_token, &session.username, name)
        .await?;
    let id = created
        .get("id")
        .and_then(|id| id.as_str())
        .ok_or_else(|| MusicApiError::Malformed("Created playlist has no id".to_owned()))?;
    Ok(Redirect::to(&playlist_location(id)))
}

pub async fn add_track(
    State(state): State<ServerState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<TrackForm>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .music_api
        .add_track(&session.access_token, &id, &form.track_uri)
        .await?;
    Ok(Redirect::to(&playlist_location(&id)))
}

pub async fn remove_track(
    State(state): State<ServerState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<TrackForm>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .music_api
        .remove_track(&session.access_token, &id, &form.track_uri)
        .await?;
    Ok(Redirect::to(&playlist_location(&id)))
}

pub async fn recommendations(
    State(state): State<ServerState>,
    session: Session,
    Query(query): Query<RecommendationsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let seeds = query.seeds();
    if seeds.is_empty() {
        return Err(ApiError::BadRequest(
            "At least one seed artist, track or genre is required".to_owned(),
        ));
    }
    let limit = query.limit.unwrap_or(state.config.recommendations_limit);
    let found = state
        .music_api
        .recommendations(&session.access_token, &seeds, limit)
        .await?;
    Ok(Json(found))
}

/// Recommendations seeded from the user's own top artists and tracks.
pub async fn top_recommendations(
    State(state): State<ServerState>,
    session: Session,
) -> Result<impl IntoResponse, ApiError> {
    let api = state.music_api.as_ref();
    let token = session.access_token.as_str();
    let (artists, tracks) = tokio::try_join!(api.top_artists(token), api.top_tracks(token))?;

    let seeds = music_api::seeds_from_top(&artists, &tracks);
    if seeds.is_empty() {
        return Err(ApiError::BadRequest(
            "No listening history to seed recommendations from".to_owned(),
        ));
    }
    let found = api
        .recommendations(token, &seeds, state.config.recommendations_limit)
        .await?;
    Ok(Json(found))
}
