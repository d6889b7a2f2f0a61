//! API route configuration.
//!
//! User-scoped endpoints identify the caller through
//! [`crate::api::extractors::OwnerId`].

use crate::api::handlers::{
    batch_shorten_handler, delete_user_urls_handler, list_user_urls_handler, shorten_handler,
};
use crate::state::AppState;
use axum::{Router, routing::get, routing::post};

/// All API routes, nested under `/api`.
///
/// # Endpoints
///
/// - `POST   /shorten`        - Create a short URL
/// - `POST   /shorten/batch`  - Create short URLs for several URLs
/// - `GET    /user/urls`      - List the caller's links
/// - `DELETE /user/urls`      - Schedule deletion of the caller's links
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/shorten/batch", post(batch_shorten_handler))
        .route(
            "/user/urls",
            get(list_user_urls_handler).delete(delete_user_urls_handler),
        )
}
