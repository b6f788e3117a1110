use std::sync::Arc;

use crate::constants::MAX_RECOMMENDATION_STACK;
use crate::db::{Catalog, RecommendationStore, StoreError, UserDirectory};
use crate::errors::RecommendationError;
use crate::models::{AnimeId, Recommendation, UserId};
use crate::utils::pagination::{PageRequest, Pagination};

/// Anime suggestions between users. Each receiver holds a bounded stack that
/// shrinks as they dismiss entries.
#[derive(Clone)]
pub struct RecommendationService {
    users: Arc<dyn UserDirectory>,
    catalog: Arc<dyn Catalog>,
    recommendations: Arc<dyn RecommendationStore>,
}

impl RecommendationService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        catalog: Arc<dyn Catalog>,
        recommendations: Arc<dyn RecommendationStore>,
    ) -> Self {
        Self { users, catalog, recommendations }
    }

    pub async fn send(&self, initiator: UserId, receiver: UserId, anime_id: AnimeId) -> Result<(), RecommendationError> {
        if initiator == receiver {
            return Err(RecommendationError::SelfRecommendation);
        }

        let target = self
            .users
            .get_by_id(receiver)
            .await?
            .ok_or(RecommendationError::UserNotFound(receiver))?;
        if !target.allows_recommendations {
            return Err(RecommendationError::RecommendationsDisabled(receiver));
        }

        if self.recommendations.count_for_receiver(receiver).await? >= MAX_RECOMMENDATION_STACK {
            return Err(RecommendationError::StackFull {
                receiver,
                max: MAX_RECOMMENDATION_STACK,
            });
        }
        if self.recommendations.exists(receiver, anime_id).await? {
            return Err(RecommendationError::AlreadyRecommended { receiver, anime_id });
        }
        if self.catalog.get_by_id(anime_id).await?.is_none() {
            return Err(RecommendationError::AnimeNotFound(anime_id));
        }

        let recommendation = Recommendation::new(initiator, receiver, anime_id);
        self.recommendations.insert(&recommendation).await.map_err(|e| match e {
            StoreError::Conflict => RecommendationError::AlreadyRecommended { receiver, anime_id },
            other => other.into(),
        })?;

        tracing::info!(initiator, receiver, anime_id, "anime recommended");
        Ok(())
    }

    pub async fn list_for_user(
        &self,
        user: UserId,
        page: PageRequest,
    ) -> Result<(Vec<Recommendation>, Pagination), RecommendationError> {
        let (recommendations, total) = self.recommendations.list_for_receiver(user, page).await?;
        Ok((recommendations, Pagination::new(page, total)))
    }

    /// Dismissing something that was never recommended is not an error.
    pub async fn dismiss(&self, receiver: UserId, anime_id: AnimeId) -> Result<(), RecommendationError> {
        if self.recommendations.delete(receiver, anime_id).await? {
            tracing::debug!(receiver, anime_id, "recommendation dismissed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::{InMemoryCatalog, InMemoryRecommendationStore, InMemoryUserDirectory};
    use crate::models::{Anime, User, UserPreferences};

    async fn setup() -> (RecommendationService, InMemoryUserDirectory) {
        let users = InMemoryUserDirectory::new();
        for (id, name) in [(1, "ayaka"), (2, "bruno"), (3, "carla")] {
            users.insert(User::new(id, name)).await;
        }
        let catalog = InMemoryCatalog::new();
        for id in 1..=30 {
            catalog
                .insert(Anime {
                    id,
                    title: format!("Anime {}", id),
                    episodes: 12,
                    image_url: None,
                    airing: false,
                })
                .await;
        }
        let service = RecommendationService::new(
            Arc::new(users.clone()),
            Arc::new(catalog),
            Arc::new(InMemoryRecommendationStore::new()),
        );
        (service, users)
    }

    #[tokio::test]
    async fn send_checks_target_and_duplicates() {
        let (service, _) = setup().await;
        assert!(matches!(service.send(1, 1, 5).await, Err(RecommendationError::SelfRecommendation)));
        assert!(matches!(service.send(1, 99, 5).await, Err(RecommendationError::UserNotFound(99))));
        assert!(matches!(service.send(1, 2, 500).await, Err(RecommendationError::AnimeNotFound(500))));

        service.send(1, 2, 5).await.unwrap();
        // Duplicates are per receiver, whoever sent the first one.
        assert!(matches!(
            service.send(3, 2, 5).await,
            Err(RecommendationError::AlreadyRecommended { receiver: 2, anime_id: 5 })
        ));
        service.send(1, 3, 5).await.unwrap();
    }

    #[tokio::test]
    async fn receiver_can_opt_out() {
        let (service, users) = setup().await;
        let prefs = UserPreferences {
            allows_recommendations: Some(false),
            ..Default::default()
        };
        users.update_preferences(2, prefs).await.unwrap();

        assert!(matches!(
            service.send(1, 2, 5).await,
            Err(RecommendationError::RecommendationsDisabled(2))
        ));
    }

    #[tokio::test]
    async fn stack_is_bounded_until_dismissed() {
        let (service, _) = setup().await;
        for anime_id in 1..=MAX_RECOMMENDATION_STACK as AnimeId {
            service.send(1, 2, anime_id).await.unwrap();
        }
        assert!(matches!(
            service.send(3, 2, 30).await,
            Err(RecommendationError::StackFull { receiver: 2, .. })
        ));

        service.dismiss(2, 1).await.unwrap();
        service.dismiss(2, 1).await.unwrap();
        service.send(3, 2, 30).await.unwrap();

        let (page, pagination) = service.list_for_user(2, PageRequest::new(1, 50)).await.unwrap();
        assert_eq!(page.len() as u64, MAX_RECOMMENDATION_STACK);
        assert_eq!(pagination.total_pages, 1);
        assert!(page.iter().all(|r| r.receiver == 2));
        assert!(!page.iter().any(|r| r.anime_id == 1));
    }
}
