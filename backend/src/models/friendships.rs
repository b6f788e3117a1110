use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};

use super::UserId;

/// State of a relationship between two users. Covers blocks as well as
/// friendships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum FriendshipStatus {
    Pending = 0,
    Accepted = 1,
    Declined = 2,
    Blocked = 3,
}

impl FriendshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendshipStatus::Pending => "pending",
            FriendshipStatus::Accepted => "accepted",
            FriendshipStatus::Declined => "declined",
            FriendshipStatus::Blocked => "blocked",
        }
    }
}

/// Directional relationship record. At most one exists per unordered pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Friendship {
    pub initiator: UserId,
    pub receiver: UserId,
    pub status: FriendshipStatus,
    pub created_at: DateTime<Utc>,
}

impl Friendship {
    pub fn request(initiator: UserId, receiver: UserId) -> Self {
        Self {
            initiator,
            receiver,
            status: FriendshipStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// A block created without any prior relationship, attributed to the blocker.
    pub fn blocked(blocker: UserId, target: UserId) -> Self {
        Self {
            initiator: blocker,
            receiver: target,
            status: FriendshipStatus::Blocked,
            created_at: Utc::now(),
        }
    }

    /// The other party of the relationship, from `user`'s point of view.
    pub fn counterpart(&self, user: UserId) -> UserId {
        if self.initiator == user {
            self.receiver
        } else {
            self.initiator
        }
    }

    pub fn key(&self) -> (UserId, UserId) {
        pair_key(self.initiator, self.receiver)
    }
}

/// Canonical (smaller, larger) key for an unordered pair of users.
pub fn pair_key(a: UserId, b: UserId) -> (UserId, UserId) {
    if a < b { (a, b) } else { (b, a) }
}
