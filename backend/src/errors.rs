use thiserror::Error;

use crate::db::StoreError;
use crate::models::{AnimeId, UserId};

#[derive(Debug, Error)]
pub enum FriendshipError {
    #[error("you cannot send a friend request to yourself")]
    SelfRelation,

    #[error("you cannot block yourself")]
    SelfBlock,

    #[error("a block exists between users {initiator} and {receiver}")]
    Blocked { initiator: UserId, receiver: UserId },

    #[error("users {initiator} and {receiver} are already friends")]
    AlreadyRelated { initiator: UserId, receiver: UserId },

    #[error("user {initiator} has already sent a friend request to user {receiver}")]
    DuplicateRequest { initiator: UserId, receiver: UserId },

    #[error("you can only accept or decline pending friend requests")]
    NotPending,

    #[error("you cannot act on this request")]
    NotAuthorized,

    #[error("user {target} is already blocked")]
    AlreadyBlocked { target: UserId },

    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("user {0} does not accept friend requests")]
    RequestsDisabled(UserId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum AnimeListError {
    #[error("anime {anime_id} is already in user {user_id}'s list")]
    AlreadyInList { user_id: UserId, anime_id: AnimeId },

    #[error("anime {0} not found")]
    ItemNotFound(AnimeId),

    #[error("anime {anime_id} is not in user {user_id}'s list")]
    NotInList { user_id: UserId, anime_id: AnimeId },

    #[error("{episodes} is not a valid watched episode count (anime has {total} episodes, 0 if unknown)")]
    InvalidEpisodeCount { episodes: u32, total: u32 },

    #[error("notes exceed the maximum length of {max} characters")]
    NotesTooLong { max: usize },

    #[error("invalid rating score {score}, scores must be between 0 and 10")]
    InvalidRating { score: u8 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("you cannot recommend an anime to yourself")]
    SelfRecommendation,

    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("anime {0} not found")]
    AnimeNotFound(AnimeId),

    #[error("user {0} does not accept recommendations")]
    RecommendationsDisabled(UserId),

    #[error("user {receiver}'s recommendation stack is full ({max} pending)")]
    StackFull { receiver: UserId, max: u64 },

    #[error("user {receiver} has already been recommended anime {anime_id}")]
    AlreadyRecommended { receiver: UserId, anime_id: AnimeId },

    #[error(transparent)]
    Store(#[from] StoreError),
}
