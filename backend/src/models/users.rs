use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};

use super::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub avatar_url: Option<String>,
    /// Whether other users may send this user friend requests
    pub allows_friend_requests: bool,
    /// Whether other users may recommend anime to this user
    pub allows_recommendations: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            username: username.into(),
            avatar_url: None,
            allows_friend_requests: true,
            allows_recommendations: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_preferences(&mut self, prefs: UserPreferences) {
        if let Some(allows) = prefs.allows_friend_requests {
            self.allows_friend_requests = allows;
        }
        if let Some(allows) = prefs.allows_recommendations {
            self.allows_recommendations = allows;
        }
        self.updated_at = Utc::now();
    }
}

/// Partial preference update; `None` leaves a setting unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct UserPreferences {
    pub allows_friend_requests: Option<bool>,
    pub allows_recommendations: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferences_only_touch_what_is_set() {
        let mut user = User::new(1, "ayaka");
        user.apply_preferences(UserPreferences {
            allows_recommendations: Some(false),
            ..Default::default()
        });
        assert!(user.allows_friend_requests);
        assert!(!user.allows_recommendations);
    }
}
