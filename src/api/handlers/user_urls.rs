//! Handlers for the links of the requesting user.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::dto::user_urls::{DeleteUrlsRequest, UserUrlResponse};
use crate::api::extractors::OwnerId;
use crate::error::AppError;
use crate::state::AppState;

/// Lists the links of the requesting user.
///
/// # Endpoint
///
/// `GET /api/user/urls`
///
/// # Response
///
/// - **200 OK** with `[{"short_url": "...", "original_url": "..."}]`
/// - **204 No Content** when the user has no links
///
/// Links whose deletion is still queued may appear until the next flush.
pub async fn list_user_urls_handler(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
) -> Result<Response, AppError> {
    let urls = state.shortener.list_by_owner(owner_id).await?;

    if urls.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let items = urls
        .iter()
        .map(|url| {
            Ok(UserUrlResponse {
                short_url: state.shortener.resolve_absolute_url(url)?.into(),
                original_url: url.original_url.clone(),
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    Ok(Json(items).into_response())
}

/// Schedules deletion of links of the requesting user.
///
/// # Endpoint
///
/// `DELETE /api/user/urls`
///
/// # Request Body
///
/// ```json
/// ["1", "2", "3"]
/// ```
///
/// # Behavior
///
/// Returns **202 Accepted** once the ids are queued. Deletion is applied by
/// the background worker within one flush interval. Ids that do not belong to
/// the user are ignored without error.
pub async fn delete_user_urls_handler(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Json(payload): Json<DeleteUrlsRequest>,
) -> Result<StatusCode, AppError> {
    state
        .shortener
        .schedule_deletions(owner_id, &payload.ids)
        .await?;

    Ok(StatusCode::ACCEPTED)
}
