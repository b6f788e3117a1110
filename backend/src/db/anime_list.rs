use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{AnimeListStore, StoreError, StoreResult};
use crate::models::{AnimeId, AnimeListEntry, ListStatus, Rating, UserId};

const ENTRY_COLUMNS: &str = "id, user_id, anime_id, status, episodes_watched, \
     rating_overall, rating_story, rating_visuals, rating_soundtrack, rating_enjoyment, \
     notes, rewatch_count, created_at, edited_at";

#[derive(Debug, FromRow)]
struct EntryRow {
    id: Uuid,
    user_id: i32,
    anime_id: i32,
    status: ListStatus,
    episodes_watched: i32,
    rating_overall: Option<i16>,
    rating_story: Option<i16>,
    rating_visuals: Option<i16>,
    rating_soundtrack: Option<i16>,
    rating_enjoyment: Option<i16>,
    notes: Option<String>,
    rewatch_count: i32,
    created_at: DateTime<Utc>,
    edited_at: Option<DateTime<Utc>>,
}

impl From<EntryRow> for AnimeListEntry {
    fn from(row: EntryRow) -> Self {
        // The rating columns are written together, so any one being NULL means no rating.
        let rating = match (
            row.rating_overall,
            row.rating_story,
            row.rating_visuals,
            row.rating_soundtrack,
            row.rating_enjoyment,
        ) {
            (Some(overall), Some(story), Some(visuals), Some(soundtrack), Some(enjoyment)) => Some(Rating {
                overall: overall as u8,
                story: story as u8,
                visuals: visuals as u8,
                soundtrack: soundtrack as u8,
                enjoyment: enjoyment as u8,
            }),
            _ => None,
        };

        Self {
            id: row.id,
            user_id: row.user_id,
            anime_id: row.anime_id,
            status: row.status,
            episodes_watched: u32::try_from(row.episodes_watched).unwrap_or(0),
            rating,
            notes: row.notes,
            rewatch_count: u32::try_from(row.rewatch_count).unwrap_or(0),
            created_at: row.created_at,
            edited_at: row.edited_at,
        }
    }
}

fn int_column(value: u32, column: &str) -> StoreResult<i32> {
    i32::try_from(value)
        .map_err(|_| StoreError::Other(anyhow::anyhow!("{} value {} out of range", column, value)))
}

#[derive(Debug, Clone)]
pub struct PgAnimeListStore {
    pool: PgPool,
}

impl PgAnimeListStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnimeListStore for PgAnimeListStore {
    async fn find(&self, user: UserId, anime: AnimeId) -> StoreResult<Option<AnimeListEntry>> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM anime_list_entries WHERE user_id = $1 AND anime_id = $2"
        );
        let row = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(user)
            .bind(anime)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(AnimeListEntry::from))
    }

    async fn insert(&self, entry: &AnimeListEntry) -> StoreResult<()> {
        let rating = entry.rating;
        let episodes_watched = int_column(entry.episodes_watched, "episodes_watched")?;
        let rewatch_count = int_column(entry.rewatch_count, "rewatch_count")?;

        sqlx::query(
            r#"
            INSERT INTO anime_list_entries (
                id, user_id, anime_id, status, episodes_watched,
                rating_overall, rating_story, rating_visuals, rating_soundtrack, rating_enjoyment,
                notes, rewatch_count, created_at, edited_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(entry.anime_id)
        .bind(entry.status)
        .bind(episodes_watched)
        .bind(rating.map(|r| r.overall as i16))
        .bind(rating.map(|r| r.story as i16))
        .bind(rating.map(|r| r.visuals as i16))
        .bind(rating.map(|r| r.soundtrack as i16))
        .bind(rating.map(|r| r.enjoyment as i16))
        .bind(entry.notes.as_deref())
        .bind(rewatch_count)
        .bind(entry.created_at)
        .bind(entry.edited_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn replace(&self, entry: &AnimeListEntry) -> StoreResult<bool> {
        let rating = entry.rating;
        let episodes_watched = int_column(entry.episodes_watched, "episodes_watched")?;
        let rewatch_count = int_column(entry.rewatch_count, "rewatch_count")?;

        let result = sqlx::query(
            r#"
            UPDATE anime_list_entries
            SET status = $3,
                episodes_watched = $4,
                rating_overall = $5,
                rating_story = $6,
                rating_visuals = $7,
                rating_soundtrack = $8,
                rating_enjoyment = $9,
                notes = $10,
                rewatch_count = $11,
                edited_at = $12
            WHERE user_id = $1 AND anime_id = $2
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.anime_id)
        .bind(entry.status)
        .bind(episodes_watched)
        .bind(rating.map(|r| r.overall as i16))
        .bind(rating.map(|r| r.story as i16))
        .bind(rating.map(|r| r.visuals as i16))
        .bind(rating.map(|r| r.soundtrack as i16))
        .bind(rating.map(|r| r.enjoyment as i16))
        .bind(entry.notes.as_deref())
        .bind(rewatch_count)
        .bind(entry.edited_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, user: UserId, anime: AnimeId) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM anime_list_entries
            WHERE user_id = $1 AND anime_id = $2
            "#,
        )
        .bind(user)
        .bind(anime)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_for_user(&self, user: UserId, status: Option<ListStatus>) -> StoreResult<Vec<AnimeListEntry>> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM anime_list_entries \
             WHERE user_id = $1 AND ($2::SMALLINT IS NULL OR status = $2) \
             ORDER BY created_at ASC"
        );
        let rows = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(user)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(AnimeListEntry::from).collect())
    }
}
