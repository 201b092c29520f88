pub mod handlers;
pub mod templates;

use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Builds the HTTP surface: the page, the label endpoint and the image files.
pub fn router(state: AppState) -> Router {
    let images = ServeDir::new(state.images_dir());

    Router::new()
        .route("/", get(handlers::index))
        .route("/label", post(handlers::assign_label))
        .nest_service("/images", images)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
