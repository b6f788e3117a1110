use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};

use super::{AnimeId, UserId};

/// An anime one user suggested to another. The receiver dismisses it to
/// make room in their stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Recommendation {
    pub initiator: UserId,
    pub receiver: UserId,
    pub anime_id: AnimeId,
    pub created_at: DateTime<Utc>,
}

impl Recommendation {
    pub fn new(initiator: UserId, receiver: UserId, anime_id: AnimeId) -> Self {
        Self {
            initiator,
            receiver,
            anime_id,
            created_at: Utc::now(),
        }
    }
}
