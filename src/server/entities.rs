//! Comments, likes and ratings on entities addressed as `kind/id`.

use super::session::Session;
use super::state::{lock, ServerState};
use super::{path_segment, ApiError};
use crate::social::{EntityRef, EntityView};
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
    Form, Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    content: String,
}

#[derive(Debug, Deserialize)]
pub struct RatingForm {
    rating: i64,
}

fn entity_location(entity: &EntityRef) -> String {
    format!(
        "/entities/{}/{}",
        path_segment(&entity.kind),
        path_segment(&entity.id)
    )
}

pub async fn get_entity(
    State(state): State<ServerState>,
    _session: Session,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<EntityView>, ApiError> {
    let entity = EntityRef::new(kind, id);
    Ok(Json(lock(&state.social)?.entity_view(&entity)))
}

pub async fn comment(
    State(state): State<ServerState>,
    session: Session,
    Path((kind, id)): Path<(String, String)>,
    Form(form): Form<CommentForm>,
) -> Result<impl IntoResponse, ApiError> {
    let entity = EntityRef::new(kind, id);
    lock(&state.social)?.comment(&session.username, &entity, &form.content)?;
    Ok(Redirect::to(&entity_location(&entity)))
}

pub async fn like(
    State(state): State<ServerState>,
    session: Session,
    Path((kind, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let entity = EntityRef::new(kind, id);
    lock(&state.social)?.like(&session.username, &entity);
    Ok(Redirect::to(&entity_location(&entity)))
}

pub async fn rate(
    State(state): State<ServerState>,
    session: Session,
    Path((kind, id)): Path<(String, String)>,
    Form(form): Form<RatingForm>,
) -> Result<impl IntoResponse, ApiError> {
    let entity = EntityRef::new(kind, id);
    lock(&state.social)?.rate(&session.username, &entity, form.rating)?;
    Ok(Redirect::to(&entity_location(&entity)))
}
