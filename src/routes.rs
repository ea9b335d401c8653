use axum::{Router, extract::DefaultBodyLimit};
use tower_http::trace::TraceLayer;

use crate::{
    AppState,
    handler::{auth::auth_handler, review::review_handler, style::style_handler},
};

/// Base64 image uploads travel inside JSON bodies.
const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

pub fn create_router(app_state: AppState) -> Router {
    let api_route = Router::new()
        .nest("/auth", auth_handler(app_state.clone()))
        .nest("/styles", style_handler(app_state.clone()))
        .nest("/reviews", review_handler(app_state.clone()))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    Router::new().nest("/api", api_route)
}
