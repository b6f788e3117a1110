use async_trait::async_trait;
use sqlx::PgPool;

use super::{StoreResult, UserDirectory};
use crate::models::{User, UserId, UserPreferences};

const USER_COLUMNS: &str =
    "id, username, avatar_url, allows_friend_requests, allows_recommendations, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, username: &str) -> StoreResult<User> {
        let sql = format!("INSERT INTO users (username) VALUES ($1) RETURNING {USER_COLUMNS}");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn get_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn get_or_create_user(&self, username: &str) -> StoreResult<User> {
        if let Some(user) = self.get_by_username(username).await? {
            Ok(user)
        } else {
            self.create_user(username).await
        }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn get_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn update_preferences(&self, id: UserId, prefs: UserPreferences) -> StoreResult<Option<User>> {
        let sql = format!(
            "UPDATE users \
             SET allows_friend_requests = COALESCE($2, allows_friend_requests), \
                 allows_recommendations = COALESCE($3, allows_recommendations), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(prefs.allows_friend_requests)
            .bind(prefs.allows_recommendations)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }
}
