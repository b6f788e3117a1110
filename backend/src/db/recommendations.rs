use async_trait::async_trait;
use sqlx::PgPool;

use super::{RecommendationStore, StoreResult};
use crate::models::{AnimeId, Recommendation, UserId};
use crate::utils::pagination::PageRequest;

#[derive(Debug, Clone)]
pub struct PgRecommendationStore {
    pool: PgPool,
}

impl PgRecommendationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecommendationStore for PgRecommendationStore {
    async fn insert(&self, recommendation: &Recommendation) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO recommendations (initiator, receiver, anime_id, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(recommendation.initiator)
        .bind(recommendation.receiver)
        .bind(recommendation.anime_id)
        .bind(recommendation.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn exists(&self, receiver: UserId, anime: AnimeId) -> StoreResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM recommendations WHERE receiver = $1 AND anime_id = $2
            )
            "#,
        )
        .bind(receiver)
        .bind(anime)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn count_for_receiver(&self, receiver: UserId) -> StoreResult<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM recommendations WHERE receiver = $1")
            .bind(receiver)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn list_for_receiver(
        &self,
        receiver: UserId,
        page: PageRequest,
    ) -> StoreResult<(Vec<Recommendation>, u64)> {
        let total = self.count_for_receiver(receiver).await?;

        let recommendations = sqlx::query_as::<_, Recommendation>(
            r#"
            SELECT initiator, receiver, anime_id, created_at
            FROM recommendations
            WHERE receiver = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(receiver)
        .bind(page.size as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok((recommendations, total))
    }

    async fn delete(&self, receiver: UserId, anime: AnimeId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM recommendations WHERE receiver = $1 AND anime_id = $2")
            .bind(receiver)
            .bind(anime)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
