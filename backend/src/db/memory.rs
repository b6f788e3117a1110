//! In-process stores with the same uniqueness rules as the Postgres ones.
//! Used by the test suites and for running the router without a database.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{AnimeListStore, Catalog, FriendshipStore, RecommendationStore, StoreError, StoreResult, UserDirectory};
use crate::models::{
    Anime, AnimeId, AnimeListEntry, Friendship, FriendshipStatus, ListStatus, Recommendation, User, UserId,
    UserPreferences, pair_key,
};
use crate::utils::pagination::PageRequest;

#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<Mutex<HashMap<UserId, User>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user: User) {
        self.users.lock().await.insert(user.id, user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn get_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.users.lock().await.get(&id).cloned())
    }

    async fn update_preferences(&self, id: UserId, prefs: UserPreferences) -> StoreResult<Option<User>> {
        let mut users = self.users.lock().await;
        Ok(users.get_mut(&id).map(|user| {
            user.apply_preferences(prefs);
            user.clone()
        }))
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    anime: Arc<Mutex<HashMap<AnimeId, Anime>>>,
    unavailable: Arc<Mutex<HashSet<AnimeId>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, anime: Anime) {
        self.anime.lock().await.insert(anime.id, anime);
    }

    /// Lookups for `id` fail with a backend error until cleared.
    pub async fn set_unavailable(&self, id: AnimeId, unavailable: bool) {
        let mut ids = self.unavailable.lock().await;
        if unavailable {
            ids.insert(id);
        } else {
            ids.remove(&id);
        }
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn get_by_id(&self, id: AnimeId) -> StoreResult<Option<Anime>> {
        if self.unavailable.lock().await.contains(&id) {
            return Err(StoreError::Other(anyhow::anyhow!("catalog lookup for anime {} failed", id)));
        }
        Ok(self.anime.lock().await.get(&id).cloned())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryFriendshipStore {
    records: Arc<Mutex<HashMap<(UserId, UserId), Friendship>>>,
}

impl InMemoryFriendshipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    async fn page_of(
        &self,
        page: PageRequest,
        mut select: impl FnMut(&Friendship) -> Option<UserId>,
    ) -> (Vec<UserId>, u64) {
        let records = self.records.lock().await;
        let mut matches: Vec<(&Friendship, UserId)> = records
            .values()
            .filter_map(|f| select(f).map(|other| (f, other)))
            .collect();
        matches.sort_by(|(a, a_id), (b, b_id)| b.created_at.cmp(&a.created_at).then(a_id.cmp(b_id)));

        let total = matches.len() as u64;
        let ids = matches
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .map(|(_, id)| id)
            .collect();
        (ids, total)
    }
}

#[async_trait]
impl FriendshipStore for InMemoryFriendshipStore {
    async fn find_between(&self, a: UserId, b: UserId) -> StoreResult<Option<Friendship>> {
        Ok(self.records.lock().await.get(&pair_key(a, b)).cloned())
    }

    async fn insert(&self, friendship: &Friendship) -> StoreResult<()> {
        let mut records = self.records.lock().await;
        if records.contains_key(&friendship.key()) {
            return Err(StoreError::Conflict);
        }
        records.insert(friendship.key(), friendship.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        a: UserId,
        b: UserId,
        from: &[FriendshipStatus],
        to: FriendshipStatus,
    ) -> StoreResult<bool> {
        match self.records.lock().await.get_mut(&pair_key(a, b)) {
            Some(record) if from.contains(&record.status) => {
                record.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn replace(&self, friendship: &Friendship, expected: FriendshipStatus) -> StoreResult<bool> {
        match self.records.lock().await.get_mut(&friendship.key()) {
            Some(record) if record.status == expected => {
                *record = friendship.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_friends(&self, user: UserId, page: PageRequest) -> StoreResult<(Vec<UserId>, u64)> {
        Ok(self
            .page_of(page, |f| {
                let involved = f.initiator == user || f.receiver == user;
                (involved && f.status == FriendshipStatus::Accepted).then(|| f.counterpart(user))
            })
            .await)
    }

    async fn list_incoming(&self, user: UserId, page: PageRequest) -> StoreResult<(Vec<UserId>, u64)> {
        Ok(self
            .page_of(page, |f| {
                (f.receiver == user && f.status == FriendshipStatus::Pending).then_some(f.initiator)
            })
            .await)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryAnimeListStore {
    entries: Arc<Mutex<HashMap<(UserId, AnimeId), AnimeListEntry>>>,
}

impl InMemoryAnimeListStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnimeListStore for InMemoryAnimeListStore {
    async fn find(&self, user: UserId, anime: AnimeId) -> StoreResult<Option<AnimeListEntry>> {
        Ok(self.entries.lock().await.get(&(user, anime)).cloned())
    }

    async fn insert(&self, entry: &AnimeListEntry) -> StoreResult<()> {
        let mut entries = self.entries.lock().await;
        let key = (entry.user_id, entry.anime_id);
        if entries.contains_key(&key) {
            return Err(StoreError::Conflict);
        }
        entries.insert(key, entry.clone());
        Ok(())
    }

    async fn replace(&self, entry: &AnimeListEntry) -> StoreResult<bool> {
        match self.entries.lock().await.get_mut(&(entry.user_id, entry.anime_id)) {
            Some(existing) => {
                *existing = entry.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, user: UserId, anime: AnimeId) -> StoreResult<bool> {
        Ok(self.entries.lock().await.remove(&(user, anime)).is_some())
    }

    async fn list_for_user(&self, user: UserId, status: Option<ListStatus>) -> StoreResult<Vec<AnimeListEntry>> {
        let entries = self.entries.lock().await;
        let mut list: Vec<AnimeListEntry> = entries
            .values()
            .filter(|e| e.user_id == user && status.is_none_or(|s| e.status == s))
            .cloned()
            .collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.anime_id.cmp(&b.anime_id)));
        Ok(list)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryRecommendationStore {
    recommendations: Arc<Mutex<HashMap<(UserId, AnimeId), Recommendation>>>,
}

impl InMemoryRecommendationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecommendationStore for InMemoryRecommendationStore {
    async fn insert(&self, recommendation: &Recommendation) -> StoreResult<()> {
        let mut recommendations = self.recommendations.lock().await;
        let key = (recommendation.receiver, recommendation.anime_id);
        if recommendations.contains_key(&key) {
            return Err(StoreError::Conflict);
        }
        recommendations.insert(key, recommendation.clone());
        Ok(())
    }

    async fn exists(&self, receiver: UserId, anime: AnimeId) -> StoreResult<bool> {
        Ok(self.recommendations.lock().await.contains_key(&(receiver, anime)))
    }

    async fn count_for_receiver(&self, receiver: UserId) -> StoreResult<u64> {
        let recommendations = self.recommendations.lock().await;
        Ok(recommendations.keys().filter(|(r, _)| *r == receiver).count() as u64)
    }

    async fn list_for_receiver(
        &self,
        receiver: UserId,
        page: PageRequest,
    ) -> StoreResult<(Vec<Recommendation>, u64)> {
        let recommendations = self.recommendations.lock().await;
        let mut matches: Vec<&Recommendation> =
            recommendations.values().filter(|r| r.receiver == receiver).collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.anime_id.cmp(&b.anime_id)));

        let total = matches.len() as u64;
        let page_items = matches
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .cloned()
            .collect();
        Ok((page_items, total))
    }

    async fn delete(&self, receiver: UserId, anime: AnimeId) -> StoreResult<bool> {
        Ok(self.recommendations.lock().await.remove(&(receiver, anime)).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn friendship_insert_conflicts_in_either_direction() {
        let store = InMemoryFriendshipStore::new();
        store.insert(&Friendship::request(1, 2)).await.unwrap();

        let err = store.insert(&Friendship::request(2, 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
        assert_eq!(store.len().await, 1);

        let found = store.find_between(2, 1).await.unwrap().unwrap();
        assert_eq!((found.initiator, found.receiver), (1, 2));
    }

    #[tokio::test]
    async fn list_entries_are_unique_per_user_and_anime() {
        let store = InMemoryAnimeListStore::new();
        store.insert(&AnimeListEntry::new(1, 42, ListStatus::Planning)).await.unwrap();
        assert!(matches!(
            store.insert(&AnimeListEntry::new(1, 42, ListStatus::Watching)).await,
            Err(StoreError::Conflict)
        ));
        store.insert(&AnimeListEntry::new(2, 42, ListStatus::Watching)).await.unwrap();

        let planning = store.list_for_user(1, Some(ListStatus::Planning)).await.unwrap();
        assert_eq!(planning.len(), 1);
        assert!(store.list_for_user(1, Some(ListStatus::Dropped)).await.unwrap().is_empty());
        assert!(store.delete(1, 42).await.unwrap());
        assert!(!store.delete(1, 42).await.unwrap());
    }

    #[tokio::test]
    async fn status_updates_only_apply_from_expected_states() {
        let store = InMemoryFriendshipStore::new();
        store.insert(&Friendship::blocked(1, 2)).await.unwrap();

        let moved = store
            .update_status(2, 1, &[FriendshipStatus::Pending], FriendshipStatus::Accepted)
            .await
            .unwrap();
        assert!(!moved);
        assert!(!store.replace(&Friendship::request(2, 1), FriendshipStatus::Declined).await.unwrap());

        let found = store.find_between(1, 2).await.unwrap().unwrap();
        assert_eq!(found.status, FriendshipStatus::Blocked);
    }

    #[tokio::test]
    async fn replacing_a_missing_entry_reports_it() {
        let store = InMemoryAnimeListStore::new();
        let entry = AnimeListEntry::new(1, 42, ListStatus::Watching);
        assert!(!store.replace(&entry).await.unwrap());

        store.insert(&entry).await.unwrap();
        assert!(store.replace(&entry).await.unwrap());
    }

    #[tokio::test]
    async fn recommendations_are_unique_per_receiver_and_anime() {
        let store = InMemoryRecommendationStore::new();
        store.insert(&Recommendation::new(1, 2, 42)).await.unwrap();
        assert!(matches!(
            store.insert(&Recommendation::new(3, 2, 42)).await,
            Err(StoreError::Conflict)
        ));
        store.insert(&Recommendation::new(1, 3, 42)).await.unwrap();

        assert_eq!(store.count_for_receiver(2).await.unwrap(), 1);
        assert!(store.exists(3, 42).await.unwrap());
        assert!(store.delete(2, 42).await.unwrap());
        assert!(!store.exists(2, 42).await.unwrap());
    }
}
