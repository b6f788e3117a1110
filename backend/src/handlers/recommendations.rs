use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;

use super::{AppState, auth::AuthUser, error::ApiError};
use crate::models::{AnimeId, Recommendation, UserId};
use crate::utils::pagination::{PageParams, Pagination};

#[derive(Debug, Serialize)]
pub struct RecommendationPage {
    pub data: Vec<Recommendation>,
    pub pagination: Pagination,
}

pub async fn send(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path((receiver_id, anime_id)): Path<(UserId, AnimeId)>,
) -> Result<StatusCode, ApiError> {
    state.recommendations.send(me, receiver_id, anime_id).await?;
    Ok(StatusCode::CREATED)
}

pub async fn list_mine(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Query(page): Query<PageParams>,
) -> Result<Json<RecommendationPage>, ApiError> {
    let (data, pagination) = state.recommendations.list_for_user(me, page.into()).await?;
    Ok(Json(RecommendationPage { data, pagination }))
}

pub async fn dismiss(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path(anime_id): Path<AnimeId>,
) -> Result<StatusCode, ApiError> {
    state.recommendations.dismiss(me, anime_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
