use axum::{
    extract::{Path, State},
    response::Json,
};

use super::{AppState, error::ApiError};
use crate::models::{Anime, AnimeId};

pub async fn get_anime(
    State(state): State<AppState>,
    Path(anime_id): Path<AnimeId>,
) -> Result<Json<Anime>, ApiError> {
    state
        .catalog
        .get_by_id(anime_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("anime {} not found", anime_id)))
}
