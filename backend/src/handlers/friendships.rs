use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{AppState, auth::AuthUser, error::ApiError};
use crate::models::{User, UserId};
use crate::utils::pagination::{PageParams, Pagination};

#[derive(Debug, Serialize)]
pub struct UserPage {
    pub data: Vec<User>,
    pub pagination: Pagination,
}

/// Relationship between the caller and another user. `status` is `"none"`
/// when the two have never interacted.
#[derive(Debug, Serialize)]
pub struct FriendshipStatusResponse {
    pub initiator: UserId,
    pub receiver: UserId,
    pub status: &'static str,
    pub created_at: Option<DateTime<Utc>>,
}

pub async fn list_friends(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Query(page): Query<PageParams>,
) -> Result<Json<UserPage>, ApiError> {
    let (data, pagination) = state.friendships.list_friends(user_id, page.into()).await?;
    Ok(Json(UserPage { data, pagination }))
}

pub async fn list_pending(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Query(page): Query<PageParams>,
) -> Result<Json<UserPage>, ApiError> {
    let (data, pagination) = state.friendships.list_pending_incoming(me, page.into()).await?;
    Ok(Json(UserPage { data, pagination }))
}

pub async fn check_status(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path(other): Path<UserId>,
) -> Result<Json<FriendshipStatusResponse>, ApiError> {
    let response = match state.friendships.fetch_status(me, other).await? {
        Some(f) => FriendshipStatusResponse {
            initiator: f.initiator,
            receiver: f.receiver,
            status: f.status.as_str(),
            created_at: Some(f.created_at),
        },
        None => FriendshipStatusResponse {
            initiator: me,
            receiver: other,
            status: "none",
            created_at: None,
        },
    };
    Ok(Json(response))
}

pub async fn send_request(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path(receiver): Path<UserId>,
) -> Result<StatusCode, ApiError> {
    state.friendships.send_request(me, receiver).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn accept_request(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path(initiator): Path<UserId>,
) -> Result<StatusCode, ApiError> {
    state.friendships.accept_request(initiator, me).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn decline_request(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path(initiator): Path<UserId>,
) -> Result<StatusCode, ApiError> {
    state.friendships.decline_request(initiator, me).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn block_user(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path(target): Path<UserId>,
) -> Result<StatusCode, ApiError> {
    state.friendships.block_user(me, target).await?;
    Ok(StatusCode::NO_CONTENT)
}
