//! Group membership and recommendations shared inside a group.

use super::session::Session;
use super::state::{lock, ServerState};
use super::{path_segment, ApiError};
use crate::groups::GroupRecommendation;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
    Form, Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateGroupForm {
    group_name: String,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationForm {
    recommendation: String,
}

#[derive(Serialize)]
struct UserGroups {
    groups: Vec<String>,
}

#[derive(Serialize)]
struct GroupRecommendations {
    group: String,
    recommendations: Vec<GroupRecommendation>,
}

pub async fn list_groups(
    State(state): State<ServerState>,
    session: Session,
) -> Result<impl IntoResponse, ApiError> {
    let groups = lock(&state.groups)?.groups_of(&session.username);
    Ok(Json(UserGroups { groups }))
}

pub async fn create_group(
    State(state): State<ServerState>,
    session: Session,
    Form(form): Form<CreateGroupForm>,
) -> Result<impl IntoResponse, ApiError> {
    lock(&state.groups)?.create(&form.group_name, &session.username)?;
    Ok(Redirect::to("/groups"))
}

pub async fn join_group(
    State(state): State<ServerState>,
    session: Session,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    lock(&state.groups)?.join(&name, &session.username)?;
    Ok(Redirect::to("/groups"))
}

pub async fn leave_group(
    State(state): State<ServerState>,
    session: Session,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    lock(&state.groups)?.leave(&name, &session.username)?;
    Ok(Redirect::to("/groups"))
}

pub async fn get_recommendations(
    State(state): State<ServerState>,
    session: Session,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let recommendations = lock(&state.groups)?
        .recommendations(&name, &session.username)?
        .to_vec();
    Ok(Json(GroupRecommendations {
        group: name,
        recommendations,
    }))
}

pub async fn recommend(
    State(state): State<ServerState>,
    session: Session,
    Path(name): Path<String>,
    Form(form): Form<RecommendationForm>,
) -> Result<impl IntoResponse, ApiError> {
    lock(&state.groups)?.recommend(&name, &session.username, &form.recommendation)?;
    Ok(Redirect::to(&format!(
        "/groups/{}/recommendations",
        path_segment(&name)
    )))
}
