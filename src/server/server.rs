use anyhow::{Context, Result};
use std::time::Duration;

use axum::{
    extract::{Query, State},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use log::info;
use serde::{Deserialize, Serialize};

use super::state::{lock, ServerState};
use super::{auth, entities, groups, log_requests, music, session::Session, users, ApiError};
use crate::stats::{self, ArtistPopularity};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub users: usize,
    pub logged_in_as: Option<String>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Debug, Deserialize)]
struct TopArtistsQuery {
    artists: Option<usize>,
    listeners: Option<usize>,
}

async fn home(
    session: Option<Session>,
    State(state): State<ServerState>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        users: lock(&state.profiles)?.len(),
        logged_in_as: session.map(|s| s.username),
    };
    Ok(Json(stats))
}

async fn top_artists(
    State(state): State<ServerState>,
    Query(query): Query<TopArtistsQuery>,
) -> Result<Json<Vec<ArtistPopularity>>, ApiError> {
    let profiles = lock(&state.profiles)?;
    Ok(Json(stats::top_artists(
        &profiles,
        query.artists.unwrap_or(5),
        query.listeners.unwrap_or(5),
    )))
}

pub fn make_app(state: ServerState) -> Router {
    let auth_routes: Router<ServerState> = Router::new()
        .route("/login", get(auth::login))
        .route("/callback", get(auth::callback))
        .route("/logout", get(auth::logout));

    let social_routes: Router<ServerState> = Router::new()
        .route("/dashboard", get(users::dashboard))
        .route("/users/{username}", get(users::get_user))
        .route("/users/{username}/similar", get(users::get_similar))
        .route("/users/{username}/follow", post(users::follow))
        .route("/users/{username}/unfollow", post(users::unfollow))
        .route("/messages", get(users::get_messages))
        .route("/messages/{username}", post(users::send_message))
        .route("/entities/{kind}/{id}", get(entities::get_entity))
        .route("/entities/{kind}/{id}/comments", post(entities::comment))
        .route("/entities/{kind}/{id}/like", post(entities::like))
        .route("/entities/{kind}/{id}/rate", post(entities::rate));

    let group_routes: Router<ServerState> = Router::new()
        .route("/groups", get(groups::list_groups).post(groups::create_group))
        .route("/groups/{name}/join", post(groups::join_group))
        .route("/groups/{name}/leave", post(groups::leave_group))
        .route(
            "/groups/{name}/recommendations",
            get(groups::get_recommendations).post(groups::recommend),
        );

    let music_routes: Router<ServerState> = Router::new()
        .route("/playlists", post(music::create_playlist))
        .route("/playlists/{id}", get(music::get_playlist))
        .route(
            "/playlists/{id}/tracks",
            post(music::add_track).delete(music::remove_track),
        )
        .route("/recommendations", get(music::recommendations))
        .route("/recommendations/top", get(music::top_recommendations));

    Router::new()
        .route("/", get(home))
        .route("/stats/top-artists", get(top_artists))
        .merge(auth_routes)
        .merge(social_routes)
        .merge(group_routes)
        .merge(music_routes)
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {err}");
    }
    info!("Shutting down");
}

pub async fn run_server(state: ServerState) -> Result<()> {
    let address = state.config.address();
    let app = make_app(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Listening on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}
