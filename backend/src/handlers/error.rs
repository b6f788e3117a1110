use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::db::StoreError;
use crate::errors::{AnimeListError, FriendshipError, RecommendationError};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(err) => {
                tracing::error!(error = ?err, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => ApiError::Conflict(err.to_string()),
            StoreError::Other(e) => ApiError::Internal(e),
        }
    }
}

impl From<FriendshipError> for ApiError {
    fn from(err: FriendshipError) -> Self {
        match err {
            FriendshipError::SelfRelation | FriendshipError::SelfBlock => ApiError::BadRequest(err.to_string()),
            FriendshipError::Blocked { .. }
            | FriendshipError::NotAuthorized
            | FriendshipError::RequestsDisabled(_) => ApiError::Forbidden(err.to_string()),
            FriendshipError::AlreadyRelated { .. }
            | FriendshipError::DuplicateRequest { .. }
            | FriendshipError::AlreadyBlocked { .. }
            | FriendshipError::NotPending => ApiError::Conflict(err.to_string()),
            FriendshipError::UserNotFound(_) => ApiError::NotFound(err.to_string()),
            FriendshipError::Store(e) => e.into(),
        }
    }
}

impl From<AnimeListError> for ApiError {
    fn from(err: AnimeListError) -> Self {
        match err {
            AnimeListError::AlreadyInList { .. } => ApiError::Conflict(err.to_string()),
            AnimeListError::ItemNotFound(_) | AnimeListError::NotInList { .. } => ApiError::NotFound(err.to_string()),
            AnimeListError::InvalidEpisodeCount { .. }
            | AnimeListError::NotesTooLong { .. }
            | AnimeListError::InvalidRating { .. } => ApiError::BadRequest(err.to_string()),
            AnimeListError::Store(e) => e.into(),
        }
    }
}

impl From<RecommendationError> for ApiError {
    fn from(err: RecommendationError) -> Self {
        match err {
            RecommendationError::SelfRecommendation => ApiError::BadRequest(err.to_string()),
            RecommendationError::RecommendationsDisabled(_) => ApiError::Forbidden(err.to_string()),
            RecommendationError::UserNotFound(_) | RecommendationError::AnimeNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            RecommendationError::StackFull { .. } | RecommendationError::AlreadyRecommended { .. } => {
                ApiError::Conflict(err.to_string())
            }
            RecommendationError::Store(e) => e.into(),
        }
    }
}
