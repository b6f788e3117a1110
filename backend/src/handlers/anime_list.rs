use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use super::{AppState, auth::AuthUser, error::ApiError};
use crate::models::{AnimeId, AnimeListEntry, ListStatus, UserId};
use crate::services::AnimeListItem;

/// `?status=` is matched case-insensitively.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: ListStatus,
}

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub episodes_watched: u32,
}

#[derive(Debug, Deserialize)]
pub struct NotesRequest {
    /// `null` clears the notes
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub story: u8,
    pub visuals: u8,
    pub soundtrack: u8,
    pub enjoyment: u8,
}

// Lists are public to read, but only their owner may change them.
fn ensure_owner(me: UserId, user_id: UserId) -> Result<(), ApiError> {
    if me != user_id {
        return Err(ApiError::Forbidden("you can only modify your own list".into()));
    }
    Ok(())
}

pub async fn get_list(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<AnimeListItem>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<ListStatus>)
        .transpose()
        .map_err(ApiError::BadRequest)?;
    let items = state.anime_list.fetch_list(user_id, status).await?;
    Ok(Json(items))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Path((user_id, anime_id)): Path<(UserId, AnimeId)>,
) -> Result<Json<AnimeListItem>, ApiError> {
    let item = state.anime_list.fetch_entry(user_id, anime_id).await?;
    Ok(Json(item))
}

pub async fn add_anime(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path((user_id, anime_id)): Path<(UserId, AnimeId)>,
    Json(req): Json<StatusRequest>,
) -> Result<(StatusCode, Json<AnimeListItem>), ApiError> {
    ensure_owner(me, user_id)?;
    let item = state.anime_list.add_item(user_id, anime_id, req.status).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_progress(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path((user_id, anime_id)): Path<(UserId, AnimeId)>,
    Json(req): Json<ProgressRequest>,
) -> Result<Json<AnimeListEntry>, ApiError> {
    ensure_owner(me, user_id)?;
    let entry = state
        .anime_list
        .update_progress(user_id, anime_id, req.episodes_watched)
        .await?;
    Ok(Json(entry))
}

pub async fn update_status(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path((user_id, anime_id)): Path<(UserId, AnimeId)>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<AnimeListEntry>, ApiError> {
    ensure_owner(me, user_id)?;
    let entry = state.anime_list.update_status(user_id, anime_id, req.status).await?;
    Ok(Json(entry))
}

pub async fn update_notes(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path((user_id, anime_id)): Path<(UserId, AnimeId)>,
    Json(req): Json<NotesRequest>,
) -> Result<Json<AnimeListEntry>, ApiError> {
    ensure_owner(me, user_id)?;
    let notes = req.notes.unwrap_or_default();
    let entry = state.anime_list.update_notes(user_id, anime_id, &notes).await?;
    Ok(Json(entry))
}

pub async fn update_rating(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path((user_id, anime_id)): Path<(UserId, AnimeId)>,
    Json(req): Json<RatingRequest>,
) -> Result<Json<AnimeListEntry>, ApiError> {
    ensure_owner(me, user_id)?;
    let entry = state
        .anime_list
        .rate(user_id, anime_id, req.story, req.visuals, req.soundtrack, req.enjoyment)
        .await?;
    Ok(Json(entry))
}

pub async fn remove_rating(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path((user_id, anime_id)): Path<(UserId, AnimeId)>,
) -> Result<Json<AnimeListEntry>, ApiError> {
    ensure_owner(me, user_id)?;
    let entry = state.anime_list.remove_rating(user_id, anime_id).await?;
    Ok(Json(entry))
}

pub async fn remove_anime(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path((user_id, anime_id)): Path<(UserId, AnimeId)>,
) -> Result<StatusCode, ApiError> {
    ensure_owner(me, user_id)?;
    state.anime_list.remove_item(user_id, anime_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
