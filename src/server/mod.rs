//! HTTP server wiring: shared state and the router.
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::arena::ArenaService;
use crate::cache::ContentCache;
use crate::config::Config;
use crate::content::ContentService;

pub mod error;
pub mod handlers;

pub use error::AppError;

/// Everything handlers need, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub arena: Arc<dyn ArenaService>,
    pub cache: Arc<dyn ContentCache>,
    pub content: Arc<ContentService>,
}

impl AppState {
    pub fn new(config: Arc<Config>, arena: Arc<dyn ArenaService>, cache: Arc<dyn ContentCache>) -> Self {
        let content = Arc::new(ContentService::new(arena.clone(), cache.clone()));
        Self {
            config,
            arena,
            cache,
            content,
        }
    }
}

/// Build the application router. CORS is wide open: every endpoint serves
/// public content for browser front-ends on other origins.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/site", get(handlers::site))
        .route("/api/content/bio", get(handlers::bio))
        .route("/api/content/work", get(handlers::work))
        .route("/api/content/blog", get(handlers::blog))
        .route("/api/content/channel/{slug}", get(handlers::channel))
        .route("/api/content/image/{id}", get(handlers::image))
        .route("/api/content/media/{id}", get(handlers::media))
        .route(
            "/api/cache/invalidate",
            get(handlers::invalidate).post(handlers::invalidate),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
