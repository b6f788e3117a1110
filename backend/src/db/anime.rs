use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use super::{Catalog, StoreResult};
use crate::models::{Anime, AnimeId};

#[derive(Debug, FromRow)]
struct AnimeRow {
    id: i32,
    title: String,
    episodes: i32,
    image_url: Option<String>,
    airing: bool,
}

impl From<AnimeRow> for Anime {
    fn from(row: AnimeRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            episodes: u32::try_from(row.episodes).unwrap_or(0),
            image_url: row.image_url,
            airing: row.airing,
        }
    }
}

/// Catalog backed by the read-only `anime` table.
#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn get_by_id(&self, id: AnimeId) -> StoreResult<Option<Anime>> {
        let row = sqlx::query_as::<_, AnimeRow>(
            r#"
            SELECT id, title, episodes, image_url, airing
            FROM anime
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Anime::from))
    }
}
