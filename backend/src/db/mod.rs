pub mod anime;
pub mod anime_list;
pub mod connection;
pub mod friendships;
pub mod memory;
pub mod migrations;
pub mod recommendations;
pub mod users;

pub use anime::PgCatalog;
pub use anime_list::PgAnimeListStore;
pub use connection::{get_db_pool, DatabaseConfig};
pub use friendships::PgFriendshipStore;
pub use recommendations::PgRecommendationStore;
pub use users::PgUserDirectory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    Anime, AnimeId, AnimeListEntry, Friendship, FriendshipStatus, ListStatus, Recommendation, User, UserId,
    UserPreferences,
};
use crate::utils::pagination::PageRequest;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A write collided with a uniqueness constraint.
    #[error("record already exists")]
    Conflict,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::Conflict,
            _ => StoreError::Other(err.into()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Existence and preference lookups for users.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_by_id(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Applies the preferences that are set. Returns the updated user, or
    /// `None` if it does not exist.
    async fn update_preferences(&self, id: UserId, prefs: UserPreferences) -> StoreResult<Option<User>>;
}

/// Read-only anime catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn get_by_id(&self, id: AnimeId) -> StoreResult<Option<Anime>>;
}

/// Relationship records, keyed by the unordered pair of users.
#[async_trait]
pub trait FriendshipStore: Send + Sync {
    /// The record between `a` and `b`, whichever of them initiated it.
    async fn find_between(&self, a: UserId, b: UserId) -> StoreResult<Option<Friendship>>;

    /// Fails with `StoreError::Conflict` if the pair already has a record.
    async fn insert(&self, friendship: &Friendship) -> StoreResult<()>;

    /// Moves the pair's record to `to`, but only while its status is one of
    /// `from`. Returns false when no record matched.
    async fn update_status(
        &self,
        a: UserId,
        b: UserId,
        from: &[FriendshipStatus],
        to: FriendshipStatus,
    ) -> StoreResult<bool>;

    /// Overwrites direction, status and timestamp of the pair's record while
    /// it is still `expected`. Returns false when no record matched.
    async fn replace(&self, friendship: &Friendship, expected: FriendshipStatus) -> StoreResult<bool>;

    /// Accepted counterparts of `user`, with the total count.
    async fn list_friends(&self, user: UserId, page: PageRequest) -> StoreResult<(Vec<UserId>, u64)>;

    /// Initiators of pending requests sent to `user`, newest first, with the total count.
    async fn list_incoming(&self, user: UserId, page: PageRequest) -> StoreResult<(Vec<UserId>, u64)>;
}

/// Anime list entries, keyed by `(user, anime)`.
#[async_trait]
pub trait AnimeListStore: Send + Sync {
    async fn find(&self, user: UserId, anime: AnimeId) -> StoreResult<Option<AnimeListEntry>>;

    /// Fails with `StoreError::Conflict` if the user already tracks the anime.
    async fn insert(&self, entry: &AnimeListEntry) -> StoreResult<()>;

    /// Returns false when the entry no longer exists.
    async fn replace(&self, entry: &AnimeListEntry) -> StoreResult<bool>;

    /// Returns whether an entry was removed.
    async fn delete(&self, user: UserId, anime: AnimeId) -> StoreResult<bool>;

    async fn list_for_user(&self, user: UserId, status: Option<ListStatus>) -> StoreResult<Vec<AnimeListEntry>>;
}

/// Anime recommendations, at most one per `(receiver, anime)`.
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    /// Fails with `StoreError::Conflict` if the receiver already has the anime recommended.
    async fn insert(&self, recommendation: &Recommendation) -> StoreResult<()>;

    async fn exists(&self, receiver: UserId, anime: AnimeId) -> StoreResult<bool>;

    async fn count_for_receiver(&self, receiver: UserId) -> StoreResult<u64>;

    /// Recommendations sent to `receiver`, newest first, with the total count.
    async fn list_for_receiver(
        &self,
        receiver: UserId,
        page: PageRequest,
    ) -> StoreResult<(Vec<Recommendation>, u64)>;

    /// Returns whether a recommendation was removed.
    async fn delete(&self, receiver: UserId, anime: AnimeId) -> StoreResult<bool>;
}
