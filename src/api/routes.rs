use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Home feed
        .route("/feed", get(handlers::get_feed))
        .route("/feed/refresh", post(handlers::refresh_feed))
        .route("/feed/more", post(handlers::load_more))
        // Genre preferences
        .route(
            "/preferences",
            get(handlers::get_preferences).delete(handlers::reset_preferences),
        )
        // Movie detail
        .route("/movies/:movie_id", get(handlers::get_movie))
        .route("/movies/:movie_id/like", post(handlers::like_movie))
        .route("/movies/:movie_id/dislike", post(handlers::dislike_movie))
}
