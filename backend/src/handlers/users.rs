use axum::{
    extract::{Path, State},
    response::Json,
};

use super::{AppState, auth::AuthUser, error::ApiError};
use crate::models::{User, UserId, UserPreferences};

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<User>, ApiError> {
    state
        .users
        .get_by_id(user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("user {} not found", user_id)))
}

/// Fields left out of the body keep their current value.
pub async fn update_preferences(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Json(prefs): Json<UserPreferences>,
) -> Result<Json<User>, ApiError> {
    state
        .users
        .update_preferences(me, prefs)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("user {} not found", me)))
}
