use async_trait::async_trait;
use sqlx::PgPool;

use super::{FriendshipStore, StoreResult};
use crate::models::{Friendship, FriendshipStatus, UserId, pair_key};
use crate::utils::pagination::PageRequest;

// The unique index on (LEAST(initiator, receiver), GREATEST(initiator, receiver))
// keeps one record per pair, so every pair lookup goes through that expression.
// Status changes are conditional on the current status so a concurrent block
// is never overwritten.

#[derive(Debug, Clone)]
pub struct PgFriendshipStore {
    pool: PgPool,
}

impl PgFriendshipStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FriendshipStore for PgFriendshipStore {
    async fn find_between(&self, a: UserId, b: UserId) -> StoreResult<Option<Friendship>> {
        let (low, high) = pair_key(a, b);

        let friendship = sqlx::query_as::<_, Friendship>(
            r#"
            SELECT initiator, receiver, status, created_at
            FROM friendships
            WHERE LEAST(initiator, receiver) = $1 AND GREATEST(initiator, receiver) = $2
            "#,
        )
        .bind(low)
        .bind(high)
        .fetch_optional(&self.pool)
        .await?;

        Ok(friendship)
    }

    async fn insert(&self, friendship: &Friendship) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO friendships (initiator, receiver, status, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(friendship.initiator)
        .bind(friendship.receiver)
        .bind(friendship.status)
        .bind(friendship.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_status(
        &self,
        a: UserId,
        b: UserId,
        from: &[FriendshipStatus],
        to: FriendshipStatus,
    ) -> StoreResult<bool> {
        let (low, high) = pair_key(a, b);
        let from: Vec<i16> = from.iter().map(|status| *status as i16).collect();

        let result = sqlx::query(
            r#"
            UPDATE friendships
            SET status = $3
            WHERE LEAST(initiator, receiver) = $1 AND GREATEST(initiator, receiver) = $2
              AND status = ANY($4)
            "#,
        )
        .bind(low)
        .bind(high)
        .bind(to)
        .bind(from)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn replace(&self, friendship: &Friendship, expected: FriendshipStatus) -> StoreResult<bool> {
        let (low, high) = friendship.key();

        let result = sqlx::query(
            r#"
            UPDATE friendships
            SET initiator = $3, receiver = $4, status = $5, created_at = $6
            WHERE LEAST(initiator, receiver) = $1 AND GREATEST(initiator, receiver) = $2
              AND status = $7
            "#,
        )
        .bind(low)
        .bind(high)
        .bind(friendship.initiator)
        .bind(friendship.receiver)
        .bind(friendship.status)
        .bind(friendship.created_at)
        .bind(expected)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_friends(&self, user: UserId, page: PageRequest) -> StoreResult<(Vec<UserId>, u64)> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM friendships
            WHERE (initiator = $1 OR receiver = $1) AND status = $2
            "#,
        )
        .bind(user)
        .bind(FriendshipStatus::Accepted)
        .fetch_one(&self.pool)
        .await?;

        let friends = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT CASE WHEN initiator = $1 THEN receiver ELSE initiator END
            FROM friendships
            WHERE (initiator = $1 OR receiver = $1) AND status = $2
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user)
        .bind(FriendshipStatus::Accepted)
        .bind(page.size as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok((friends, total.max(0) as u64))
    }

    async fn list_incoming(&self, user: UserId, page: PageRequest) -> StoreResult<(Vec<UserId>, u64)> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM friendships
            WHERE receiver = $1 AND status = $2
            "#,
        )
        .bind(user)
        .bind(FriendshipStatus::Pending)
        .fetch_one(&self.pool)
        .await?;

        let initiators = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT initiator
            FROM friendships
            WHERE receiver = $1 AND status = $2
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user)
        .bind(FriendshipStatus::Pending)
        .bind(page.size as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok((initiators, total.max(0) as u64))
    }
}
