use serde::{Deserialize, Serialize};

use super::AnimeId;

/// Read-only catalog entry, as much of it as the list features need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anime {
    pub id: AnimeId,
    pub title: String,
    /// Total episode count, 0 while unknown (still airing or untracked)
    pub episodes: u32,
    pub image_url: Option<String>,
    pub airing: bool,
}
