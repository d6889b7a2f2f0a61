//! Handlers for the shortening endpoints.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::json;
use url::Url;
use validator::Validate;

use crate::api::dto::shorten::{
    BatchShortenItem, BatchShortenResult, ShortenRequest, ShortenResponse,
};
use crate::api::extractors::OwnerId;
use crate::domain::entities::{ShortenedUrl, UrlToShorten};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short URL.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/some/long/path" }
/// ```
///
/// # Response
///
/// - **201 Created** with `{"result": "<short url>"}` for a new link
/// - **409 Conflict** with the same body carrying the already existing short URL
///
/// # Errors
///
/// Returns 400 Bad Request if the URL is invalid, 401 if the user is unknown.
pub async fn shorten_handler(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    payload.validate()?;

    let original_url = parse_original_url(&payload.url)?;
    let (status, url) = shorten_or_existing(&state, original_url, owner_id).await?;
    let short_url = state.shortener.resolve_absolute_url(&url)?;

    Ok((
        status,
        Json(ShortenResponse {
            result: short_url.into(),
        }),
    ))
}

/// Creates short URLs for several original URLs at once.
///
/// # Endpoint
///
/// `POST /api/shorten/batch`
///
/// # Request Body
///
/// ```json
/// [
///   { "correlation_id": "a", "original_url": "https://example.com/1" },
///   { "correlation_id": "b", "original_url": "https://example.com/2" }
/// ]
/// ```
///
/// URLs that are already shortened resolve to their existing short URL.
/// The whole request is validated before anything is stored.
///
/// # Errors
///
/// Returns 400 Bad Request if the batch is empty or any entry is invalid.
pub async fn batch_shorten_handler(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Json(items): Json<Vec<BatchShortenItem>>,
) -> Result<(StatusCode, Json<Vec<BatchShortenResult>>), AppError> {
    if items.is_empty() {
        return Err(AppError::bad_request("Batch must not be empty", json!({})));
    }

    let mut parsed = Vec::with_capacity(items.len());
    for item in items {
        item.validate()?;
        let original_url = parse_original_url(&item.original_url)?;
        parsed.push((item.correlation_id, original_url));
    }

    let mut results = Vec::with_capacity(parsed.len());
    for (correlation_id, original_url) in parsed {
        let (_, url) = shorten_or_existing(&state, original_url, owner_id).await?;
        let short_url = state.shortener.resolve_absolute_url(&url)?;

        results.push(BatchShortenResult {
            correlation_id,
            short_url: short_url.into(),
        });
    }

    Ok((StatusCode::CREATED, Json(results)))
}

/// Shortens `original_url`, answering a conflict with the existing record.
///
/// Returns `201 Created` with the new record or `409 Conflict` with the
/// record that already holds the URL.
async fn shorten_or_existing(
    state: &AppState,
    original_url: Url,
    owner_id: i64,
) -> Result<(StatusCode, ShortenedUrl), AppError> {
    let request = UrlToShorten::new(original_url.clone(), owner_id);

    match state.shortener.shorten_url(request).await {
        Ok(url) => Ok((StatusCode::CREATED, url)),
        Err(AppError::Conflict { .. }) => {
            let existing = state.shortener.lookup_by_original_url(&original_url).await?;
            Ok((StatusCode::CONFLICT, existing))
        }
        Err(e) => Err(e),
    }
}

fn parse_original_url(raw: &str) -> Result<Url, AppError> {
    Url::parse(raw.trim()).map_err(|e| {
        AppError::bad_request(
            "Invalid URL format",
            json!({ "url": raw, "reason": e.to_string() }),
        )
    })
}
