//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::Redirect,
};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short URL id to its original URL.
///
/// # Endpoint
///
/// `GET /{id}`
///
/// # Response
///
/// - **307 Temporary Redirect** to the original URL
/// - **410 Gone** if the link was deleted
/// - **404 Not Found** if the id was never issued
pub async fn redirect_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    let url = state.shortener.get_by_id(id).await?;

    if url.deleted {
        return Err(AppError::gone("Short URL was deleted", json!({ "id": id })));
    }

    Ok(Redirect::temporary(&url.original_url))
}
