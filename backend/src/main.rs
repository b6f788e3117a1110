use afurada::{AppState, Config, create_router, get_db_pool, utils};
use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_logging();

    let config = Config::from_env()?;
    let db_config = afurada::db::DatabaseConfig::from_env()?;
    let pool = get_db_pool(&db_config).await?;

    // Run migrations
    afurada::db::migrations::run_migrations(&pool).await?;

    let port = config.port;
    let cors_layer = create_cors_layer(&config);
    let app = create_router(AppState::from_pool(pool, &config)).layer(cors_layer);

    let listener = tokio::net::TcpListener::bind(&format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Server running on port {}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn create_cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(false);

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        // Default to permissive for development
        tracing::warn!("ALLOWED_ORIGINS not set, allowing any origin");
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}
