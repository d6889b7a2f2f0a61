//! Handler for the storage liveness probe.

use axum::extract::State;

use crate::error::AppError;
use crate::state::AppState;

/// Reports whether the storage backend answers.
///
/// # Endpoint
///
/// `GET /ping`
///
/// # Response Codes
///
/// - **200 OK**: storage reachable
/// - **503 Service Unavailable**: storage unreachable
pub async fn ping_handler(State(state): State<AppState>) -> Result<&'static str, AppError> {
    state.shortener.ping().await?;
    Ok("OK")
}
