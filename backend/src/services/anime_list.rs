use std::sync::Arc;

use serde::Serialize;

use crate::db::{AnimeListStore, Catalog, StoreError};
use crate::errors::AnimeListError;
use crate::models::{Anime, AnimeId, AnimeListEntry, ListStatus, Rating, UserId};

/// A list entry joined with the catalog data needed to display it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnimeListItem {
    pub anime_title: String,
    pub anime_episodes: u32,
    pub anime_cover_url: Option<String>,
    #[serde(flatten)]
    pub entry: AnimeListEntry,
}

impl AnimeListItem {
    fn new(entry: AnimeListEntry, anime: Anime) -> Self {
        Self {
            anime_title: anime.title,
            anime_episodes: anime.episodes,
            anime_cover_url: anime.image_url,
            entry,
        }
    }
}

/// Owns the lifecycle of users' anime list entries.
#[derive(Clone)]
pub struct AnimeListService {
    entries: Arc<dyn AnimeListStore>,
    catalog: Arc<dyn Catalog>,
}

impl AnimeListService {
    pub fn new(entries: Arc<dyn AnimeListStore>, catalog: Arc<dyn Catalog>) -> Self {
        Self { entries, catalog }
    }

    pub async fn add_item(
        &self,
        user_id: UserId,
        anime_id: AnimeId,
        status: ListStatus,
    ) -> Result<AnimeListItem, AnimeListError> {
        if self.entries.find(user_id, anime_id).await?.is_some() {
            return Err(AnimeListError::AlreadyInList { user_id, anime_id });
        }
        let anime = self.require_anime(anime_id).await?;

        let mut entry = AnimeListEntry::new(user_id, anime_id, status);
        if status == ListStatus::Completed {
            entry.fill_episodes(anime.episodes);
        }

        // The pre-check above only gives a nicer error; the store has the final word.
        self.entries.insert(&entry).await.map_err(|e| match e {
            StoreError::Conflict => AnimeListError::AlreadyInList { user_id, anime_id },
            other => other.into(),
        })?;

        tracing::info!(user_id, anime_id, ?status, "anime added to list");
        Ok(AnimeListItem::new(entry, anime))
    }

    pub async fn update_progress(
        &self,
        user_id: UserId,
        anime_id: AnimeId,
        episodes_watched: u32,
    ) -> Result<AnimeListEntry, AnimeListError> {
        let mut entry = self.require_entry(user_id, anime_id).await?;
        let anime = self.require_anime(anime_id).await?;

        entry.update_progress(episodes_watched, anime.episodes)?;
        self.save(&entry).await?;

        tracing::debug!(user_id, anime_id, episodes_watched, status = ?entry.status, "progress updated");
        Ok(entry)
    }

    pub async fn update_status(
        &self,
        user_id: UserId,
        anime_id: AnimeId,
        status: ListStatus,
    ) -> Result<AnimeListEntry, AnimeListError> {
        let mut entry = self.require_entry(user_id, anime_id).await?;
        if !entry.update_status(status) {
            return Ok(entry);
        }

        if status == ListStatus::Completed {
            // Back-filling progress is best effort, the status change stands on its own.
            match self.catalog.get_by_id(anime_id).await {
                Ok(Some(anime)) => entry.fill_episodes(anime.episodes),
                Ok(None) => tracing::warn!(anime_id, "anime missing from catalog, progress not back-filled"),
                Err(e) => tracing::warn!(anime_id, error = %e, "catalog lookup failed, progress not back-filled"),
            }
        }

        self.save(&entry).await?;
        tracing::debug!(user_id, anime_id, ?status, "status updated");
        Ok(entry)
    }

    pub async fn update_notes(
        &self,
        user_id: UserId,
        anime_id: AnimeId,
        notes: &str,
    ) -> Result<AnimeListEntry, AnimeListError> {
        let mut entry = self.require_entry(user_id, anime_id).await?;
        entry.update_notes(notes)?;
        self.save(&entry).await?;
        Ok(entry)
    }

    pub async fn rate(
        &self,
        user_id: UserId,
        anime_id: AnimeId,
        story: u8,
        visuals: u8,
        soundtrack: u8,
        enjoyment: u8,
    ) -> Result<AnimeListEntry, AnimeListError> {
        let rating = Rating::new(story, visuals, soundtrack, enjoyment)?;
        let mut entry = self.require_entry(user_id, anime_id).await?;
        entry.rate(rating);
        self.save(&entry).await?;

        tracing::debug!(user_id, anime_id, overall = rating.overall, "rating saved");
        Ok(entry)
    }

    pub async fn remove_rating(&self, user_id: UserId, anime_id: AnimeId) -> Result<AnimeListEntry, AnimeListError> {
        let mut entry = self.require_entry(user_id, anime_id).await?;
        entry.clear_rating();
        self.save(&entry).await?;
        Ok(entry)
    }

    /// Removing an entry that is not there is not an error.
    pub async fn remove_item(&self, user_id: UserId, anime_id: AnimeId) -> Result<(), AnimeListError> {
        if self.entries.delete(user_id, anime_id).await? {
            tracing::info!(user_id, anime_id, "anime removed from list");
        }
        Ok(())
    }

    pub async fn fetch_entry(&self, user_id: UserId, anime_id: AnimeId) -> Result<AnimeListItem, AnimeListError> {
        let entry = self.require_entry(user_id, anime_id).await?;
        let anime = self.require_anime(anime_id).await?;
        Ok(AnimeListItem::new(entry, anime))
    }

    /// Entries whose anime can no longer be resolved are skipped.
    pub async fn fetch_list(
        &self,
        user_id: UserId,
        status: Option<ListStatus>,
    ) -> Result<Vec<AnimeListItem>, AnimeListError> {
        let entries = self.entries.list_for_user(user_id, status).await?;

        let mut items = Vec::with_capacity(entries.len());
        for entry in entries {
            match self.catalog.get_by_id(entry.anime_id).await {
                Ok(Some(anime)) => items.push(AnimeListItem::new(entry, anime)),
                Ok(None) => {
                    tracing::warn!(user_id, anime_id = entry.anime_id, "listed anime not found in catalog")
                }
                Err(e) => {
                    tracing::warn!(user_id, anime_id = entry.anime_id, error = %e, "catalog lookup failed")
                }
            }
        }
        Ok(items)
    }

    async fn require_entry(&self, user_id: UserId, anime_id: AnimeId) -> Result<AnimeListEntry, AnimeListError> {
        self.entries
            .find(user_id, anime_id)
            .await?
            .ok_or(AnimeListError::NotInList { user_id, anime_id })
    }

    /// Writes back an entry read earlier in the same operation.
    async fn save(&self, entry: &AnimeListEntry) -> Result<(), AnimeListError> {
        if !self.entries.replace(entry).await? {
            return Err(AnimeListError::NotInList {
                user_id: entry.user_id,
                anime_id: entry.anime_id,
            });
        }
        Ok(())
    }

    async fn require_anime(&self, anime_id: AnimeId) -> Result<Anime, AnimeListError> {
        self.catalog
            .get_by_id(anime_id)
            .await?
            .ok_or(AnimeListError::ItemNotFound(anime_id))
    }
}
