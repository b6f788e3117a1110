use std::sync::Arc;

use afurada::db::memory::{
    InMemoryAnimeListStore, InMemoryCatalog, InMemoryFriendshipStore, InMemoryRecommendationStore,
    InMemoryUserDirectory,
};
use afurada::handlers::issue_token;
use afurada::models::{Anime, User, UserId};
use afurada::services::{AnimeListService, FriendRequestPolicy, FriendshipService, RecommendationService};
use afurada::{AppState, create_router};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "test-secret";

async fn test_app() -> Router {
    let users = InMemoryUserDirectory::new();
    for (id, name) in [(1, "ayumi"), (2, "kenji"), (3, "mitsuko")] {
        users.insert(User::new(id, name)).await;
    }

    let catalog = InMemoryCatalog::new();
    catalog
        .insert(Anime {
            id: 42,
            title: "Mushishi".into(),
            episodes: 26,
            image_url: Some("https://img.example/mushishi.jpg".into()),
            airing: false,
        })
        .await;
    catalog
        .insert(Anime {
            id: 21,
            title: "One Piece".into(),
            episodes: 0,
            image_url: None,
            airing: true,
        })
        .await;

    let users = Arc::new(users);
    let catalog = Arc::new(catalog);
    let friendships = FriendshipService::new(
        users.clone(),
        Arc::new(InMemoryFriendshipStore::new()),
        FriendRequestPolicy::default(),
    );
    let anime_list = AnimeListService::new(Arc::new(InMemoryAnimeListStore::new()), catalog.clone());
    let recommendations = RecommendationService::new(
        users.clone(),
        catalog.clone(),
        Arc::new(InMemoryRecommendationStore::new()),
    );

    create_router(AppState::new(users, catalog, friendships, anime_list, recommendations, SECRET))
}

fn token_for(user: UserId) -> String {
    issue_token(user, SECRET, chrono::Duration::hours(1)).unwrap()
}

async fn call(app: &Router, method: Method, uri: &str, user: Option<UserId>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token_for(user)));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn health_check_responds() {
    let app = test_app().await;
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn mutating_routes_require_a_valid_token() {
    let app = test_app().await;

    let (status, _) = call(&app, Method::PUT, "/friends/send/2", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method(Method::PUT)
        .uri("/friends/send/2")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let forged = issue_token(1, "some-other-secret", chrono::Duration::hours(1)).unwrap();
    let request = Request::builder()
        .method(Method::PUT)
        .uri("/friends/send/2")
        .header(header::AUTHORIZATION, format!("Bearer {}", forged))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn crossed_requests_become_a_friendship() {
    let app = test_app().await;

    let (status, _) = call(&app, Method::PUT, "/friends/send/2", Some(1), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, pending) = call(&app, Method::GET, "/friends/pending", Some(2), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending["data"][0]["id"], 1);

    let (status, _) = call(&app, Method::PUT, "/friends/send/1", Some(2), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, check) = call(&app, Method::GET, "/friends/check/2", Some(1), None).await;
    assert_eq!(check["status"], "accepted");
    assert_eq!(check["initiator"], 1);
    assert_eq!(check["receiver"], 2);

    let (status, friends) = call(&app, Method::GET, "/friends/1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(friends["data"][0]["username"], "kenji");
    assert_eq!(friends["pagination"]["total_pages"], 1);

    let (status, _) = call(&app, Method::PUT, "/friends/send/1", Some(2), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn only_the_receiver_answers_a_request() {
    let app = test_app().await;
    call(&app, Method::PUT, "/friends/send/2", Some(1), None).await;

    // The sender cannot accept on the receiver's behalf.
    let (status, _) = call(&app, Method::PUT, "/friends/accept/2", Some(1), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app, Method::PUT, "/friends/accept/1", Some(3), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call(&app, Method::PUT, "/friends/decline/1", Some(2), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, check) = call(&app, Method::GET, "/friends/check/1", Some(2), None).await;
    assert_eq!(check["status"], "declined");

    // A declined request can be sent again.
    let (status, _) = call(&app, Method::PUT, "/friends/send/2", Some(1), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, check) = call(&app, Method::GET, "/friends/check/1", Some(2), None).await;
    assert_eq!(check["status"], "pending");
}

#[tokio::test]
async fn blocks_and_preferences_stop_requests() {
    let app = test_app().await;

    let (status, _) = call(&app, Method::PUT, "/friends/block/1", Some(2), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&app, Method::PUT, "/friends/send/2", Some(1), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, user) = call(
        &app,
        Method::PATCH,
        "/users/me/preferences",
        Some(3),
        Some(json!({ "allows_friend_requests": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["allows_friend_requests"], false);

    let (status, _) = call(&app, Method::PUT, "/friends/send/3", Some(1), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app, Method::PUT, "/friends/send/1", Some(1), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, Method::PUT, "/friends/send/99", Some(1), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn friend_lists_are_paginated() {
    let app = test_app().await;
    for other in [2, 3] {
        call(&app, Method::PUT, &format!("/friends/send/{}", other), Some(1), None).await;
        call(&app, Method::PUT, "/friends/accept/1", Some(other), None).await;
    }

    let (status, page) = call(&app, Method::GET, "/friends/1?page_number=2&page_size=1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["data"].as_array().unwrap().len(), 1);
    assert_eq!(page["pagination"]["page_number"], 2);
    assert_eq!(page["pagination"]["total_pages"], 2);
}

#[tokio::test]
async fn anime_list_lifecycle() {
    let app = test_app().await;

    let (status, item) = call(&app, Method::POST, "/animelist/1/42", Some(1), Some(json!({ "status": "watching" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["anime_title"], "Mushishi");
    assert_eq!(item["episodes_watched"], 0);

    let (status, _) = call(&app, Method::POST, "/animelist/1/42", Some(1), Some(json!({ "status": "planning" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, entry) = call(
        &app,
        Method::PATCH,
        "/animelist/1/42/progress",
        Some(1),
        Some(json!({ "episodes_watched": 26 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["status"], "completed");

    let (status, _) = call(
        &app,
        Method::PATCH,
        "/animelist/1/42/progress",
        Some(1),
        Some(json!({ "episodes_watched": 27 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, entry) = call(
        &app,
        Method::PATCH,
        "/animelist/1/42/rating",
        Some(1),
        Some(json!({ "story": 8, "visuals": 6, "soundtrack": 10, "enjoyment": 7 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["rating"]["overall"], 7);

    let (status, _) = call(
        &app,
        Method::PATCH,
        "/animelist/1/42/rating",
        Some(1),
        Some(json!({ "story": 11, "visuals": 6, "soundtrack": 10, "enjoyment": 7 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, entry) = call(&app, Method::DELETE, "/animelist/1/42/rating", Some(1), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(entry["rating"].is_null());

    let (status, list) = call(&app, Method::GET, "/animelist/1?status=completed", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    let (_, list) = call(&app, Method::GET, "/animelist/1?status=dropped", None, None).await;
    assert!(list.as_array().unwrap().is_empty());

    let (status, _) = call(&app, Method::DELETE, "/animelist/1/42", Some(1), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&app, Method::DELETE, "/animelist/1/42", Some(1), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(&app, Method::GET, "/animelist/1/42", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn notes_are_limited_and_clearable() {
    let app = test_app().await;
    call(&app, Method::POST, "/animelist/1/42", Some(1), Some(json!({ "status": "planning" }))).await;

    let long = "a".repeat(501);
    let (status, _) = call(&app, Method::PATCH, "/animelist/1/42/notes", Some(1), Some(json!({ "notes": long }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, entry) = call(
        &app,
        Method::PATCH,
        "/animelist/1/42/notes",
        Some(1),
        Some(json!({ "notes": "rewatch in winter" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["notes"], "rewatch in winter");

    let (_, entry) = call(&app, Method::PATCH, "/animelist/1/42/notes", Some(1), Some(json!({ "notes": null }))).await;
    assert!(entry["notes"].is_null());
}

#[tokio::test]
async fn lists_are_only_writable_by_their_owner() {
    let app = test_app().await;

    let (status, _) = call(&app, Method::POST, "/animelist/1/42", Some(2), Some(json!({ "status": "watching" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app, Method::POST, "/animelist/1/7", Some(1), Some(json!({ "status": "watching" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn users_and_catalog_are_readable() {
    let app = test_app().await;

    let (status, user) = call(&app, Method::GET, "/users/2", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["username"], "kenji");

    let (status, anime) = call(&app, Method::GET, "/anime/42", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(anime["episodes"], 26);

    let (status, _) = call(&app, Method::GET, "/anime/7", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_filter_accepts_any_case() {
    let app = test_app().await;
    call(&app, Method::POST, "/animelist/1/42", Some(1), Some(json!({ "status": "completed" }))).await;

    let (status, list) = call(&app, Method::GET, "/animelist/1?status=Completed", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = call(&app, Method::GET, "/animelist/1?status=rewatching", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_progress_is_a_client_error() {
    let app = test_app().await;
    call(&app, Method::POST, "/animelist/1/21", Some(1), Some(json!({ "status": "watching" }))).await;

    let (status, _) = call(
        &app,
        Method::PATCH,
        "/animelist/1/21/progress",
        Some(1),
        Some(json!({ "episodes_watched": 3_000_000_000u64 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, entry) = call(
        &app,
        Method::PATCH,
        "/animelist/1/21/progress",
        Some(1),
        Some(json!({ "episodes_watched": 1100 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["status"], "watching");
}

#[tokio::test]
async fn recommendations_flow() {
    let app = test_app().await;

    let (status, _) = call(&app, Method::POST, "/recommendations/2/42", Some(1), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = call(&app, Method::POST, "/recommendations/2/42", Some(3), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = call(&app, Method::POST, "/recommendations/1/42", Some(1), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, page) = call(&app, Method::GET, "/recommendations", Some(2), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["data"][0]["initiator"], 1);
    assert_eq!(page["data"][0]["anime_id"], 42);

    let (status, _) = call(&app, Method::DELETE, "/recommendations/42", Some(2), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, page) = call(&app, Method::GET, "/recommendations", Some(2), None).await;
    assert!(page["data"].as_array().unwrap().is_empty());

    call(
        &app,
        Method::PATCH,
        "/users/me/preferences",
        Some(2),
        Some(json!({ "allows_recommendations": false })),
    )
    .await;
    let (status, _) = call(&app, Method::POST, "/recommendations/2/21", Some(1), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app, Method::GET, "/recommendations", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
