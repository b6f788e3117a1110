pub mod anime;
pub mod anime_list;
pub mod auth;
pub mod error;
pub mod friendships;
pub mod recommendations;
pub mod users;

pub use auth::{AuthUser, Claims, issue_token};
pub use error::ApiError;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use crate::db::{
    Catalog, PgAnimeListStore, PgCatalog, PgFriendshipStore, PgRecommendationStore, PgUserDirectory, UserDirectory,
};
use crate::services::{AnimeListService, FriendRequestPolicy, FriendshipService, RecommendationService};
use crate::utils::Config;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserDirectory>,
    pub catalog: Arc<dyn Catalog>,
    pub friendships: FriendshipService,
    pub anime_list: AnimeListService,
    pub recommendations: RecommendationService,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        catalog: Arc<dyn Catalog>,
        friendships: FriendshipService,
        anime_list: AnimeListService,
        recommendations: RecommendationService,
        jwt_secret: &str,
    ) -> Self {
        Self {
            users,
            catalog,
            friendships,
            anime_list,
            recommendations,
            jwt_secret: Arc::from(jwt_secret),
        }
    }

    /// Wires every service to its Postgres-backed store.
    pub fn from_pool(pool: PgPool, config: &Config) -> Self {
        let users: Arc<dyn UserDirectory> = Arc::new(PgUserDirectory::new(pool.clone()));
        let catalog: Arc<dyn Catalog> = Arc::new(PgCatalog::new(pool.clone()));
        let policy = FriendRequestPolicy {
            enforce_receiver_preference: config.enforce_friend_request_preference,
        };

        let friendships = FriendshipService::new(
            users.clone(),
            Arc::new(PgFriendshipStore::new(pool.clone())),
            policy,
        );
        let anime_list = AnimeListService::new(Arc::new(PgAnimeListStore::new(pool.clone())), catalog.clone());
        let recommendations = RecommendationService::new(
            users.clone(),
            catalog.clone(),
            Arc::new(PgRecommendationStore::new(pool)),
        );

        Self::new(users, catalog, friendships, anime_list, recommendations, &config.jwt_secret)
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Users
        .route("/users/me/preferences", patch(users::update_preferences))
        .route("/users/{user_id}", get(users::get_user))
        // Catalog
        .route("/anime/{anime_id}", get(anime::get_anime))
        // Friends
        .route("/friends/pending", get(friendships::list_pending))
        .route("/friends/check/{other_id}", get(friendships::check_status))
        .route("/friends/send/{receiver_id}", put(friendships::send_request))
        .route("/friends/accept/{initiator_id}", put(friendships::accept_request))
        .route("/friends/decline/{initiator_id}", put(friendships::decline_request))
        .route("/friends/block/{target_id}", put(friendships::block_user))
        .route("/friends/{user_id}", get(friendships::list_friends))
        // Anime lists
        .route("/animelist/{user_id}", get(anime_list::get_list))
        .route(
            "/animelist/{user_id}/{anime_id}",
            get(anime_list::get_entry)
                .post(anime_list::add_anime)
                .delete(anime_list::remove_anime),
        )
        .route("/animelist/{user_id}/{anime_id}/progress", patch(anime_list::update_progress))
        .route("/animelist/{user_id}/{anime_id}/status", patch(anime_list::update_status))
        .route("/animelist/{user_id}/{anime_id}/notes", patch(anime_list::update_notes))
        .route(
            "/animelist/{user_id}/{anime_id}/rating",
            patch(anime_list::update_rating).delete(anime_list::remove_rating),
        )
        // Recommendations
        .route("/recommendations", get(recommendations::list_mine))
        .route("/recommendations/{anime_id}", delete(recommendations::dismiss))
        .route("/recommendations/{receiver_id}/{anime_id}", post(recommendations::send))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
