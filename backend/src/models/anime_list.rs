use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{AnimeId, UserId};
use crate::constants::{MAX_EPISODES_WATCHED, MAX_NOTES_LENGTH, MAX_RATING_SCORE};
use crate::errors::AnimeListError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum ListStatus {
    Watching = 0,
    Completed = 1,
    Paused = 2,
    Dropped = 3,
    Planning = 4,
}

impl std::str::FromStr for ListStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "watching" => Ok(ListStatus::Watching),
            "completed" => Ok(ListStatus::Completed),
            "paused" => Ok(ListStatus::Paused),
            "dropped" => Ok(ListStatus::Dropped),
            "planning" => Ok(ListStatus::Planning),
            other => Err(format!("unknown list status: {}", other)),
        }
    }
}

/// Per-category scores plus the derived overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub overall: u8,
    pub story: u8,
    pub visuals: u8,
    pub soundtrack: u8,
    pub enjoyment: u8,
}

impl Rating {
    /// Validates each score and computes `overall` as the truncated mean.
    pub fn new(story: u8, visuals: u8, soundtrack: u8, enjoyment: u8) -> Result<Self, AnimeListError> {
        for score in [story, visuals, soundtrack, enjoyment] {
            if score > MAX_RATING_SCORE {
                return Err(AnimeListError::InvalidRating { score });
            }
        }

        let sum = story as u16 + visuals as u16 + soundtrack as u16 + enjoyment as u16;
        Ok(Self {
            overall: (sum / 4) as u8,
            story,
            visuals,
            soundtrack,
            enjoyment,
        })
    }
}

/// A user's tracking record for one catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimeListEntry {
    pub id: Uuid,
    pub user_id: UserId,
    pub anime_id: AnimeId,
    pub status: ListStatus,
    pub episodes_watched: u32,
    pub rating: Option<Rating>,
    pub notes: Option<String>,
    pub rewatch_count: u32,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

impl AnimeListEntry {
    pub fn new(user_id: UserId, anime_id: AnimeId, status: ListStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            anime_id,
            status,
            episodes_watched: 0,
            rating: None,
            notes: None,
            rewatch_count: 0,
            created_at: Utc::now(),
            edited_at: None,
        }
    }

    /// Sets progress against the catalog total (0 = unknown).
    ///
    /// A completed entry cannot go past a known total, and reaching a known
    /// total marks the entry completed. Unknown totals are only bounded by
    /// `MAX_EPISODES_WATCHED`.
    pub fn update_progress(&mut self, episodes: u32, total: u32) -> Result<(), AnimeListError> {
        let past_total = total > 0 && self.status == ListStatus::Completed && episodes > total;
        if past_total || episodes > MAX_EPISODES_WATCHED {
            return Err(AnimeListError::InvalidEpisodeCount { episodes, total });
        }

        self.episodes_watched = episodes;
        if total > 0 && episodes == total {
            self.status = ListStatus::Completed;
        }
        self.touch();
        Ok(())
    }

    /// Returns false when the status is unchanged, in which case nothing is touched.
    pub fn update_status(&mut self, status: ListStatus) -> bool {
        if self.status == status {
            return false;
        }
        self.status = status;
        self.touch();
        true
    }

    /// Marks every episode as watched when the total is known.
    pub fn fill_episodes(&mut self, total: u32) {
        if total > 0 {
            self.episodes_watched = total;
        }
    }

    /// Empty text clears the notes.
    pub fn update_notes(&mut self, notes: &str) -> Result<(), AnimeListError> {
        if notes.chars().count() > MAX_NOTES_LENGTH {
            return Err(AnimeListError::NotesTooLong { max: MAX_NOTES_LENGTH });
        }
        self.notes = (!notes.is_empty()).then(|| notes.to_string());
        self.touch();
        Ok(())
    }

    pub fn rate(&mut self, rating: Rating) {
        self.rating = Some(rating);
        self.touch();
    }

    pub fn clear_rating(&mut self) {
        self.rating = None;
        self.touch();
    }

    fn touch(&mut self) {
        self.edited_at = Some(Utc::now());
    }
}
