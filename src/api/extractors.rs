//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde_json::json;

use crate::error::AppError;

/// Header carrying the id of the user on whose behalf the request is made.
///
/// Identity is issued and verified upstream; this service trusts the value.
pub const OWNER_HEADER: &str = "x-user-id";

/// Owner of the links a request operates on, read from [`OWNER_HEADER`].
///
/// Add this as a handler parameter to require an identified user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerId(pub i64);

impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::unauthorized("Missing user identity", json!({ "header": OWNER_HEADER }))
            })?;

        value.trim().parse().map(OwnerId).map_err(|_| {
            AppError::unauthorized("Invalid user identity", json!({ "header": OWNER_HEADER }))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<OwnerId, AppError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(OWNER_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        OwnerId::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_owner_id_from_header() {
        assert_eq!(extract(Some("42")).await.unwrap(), OwnerId(42));
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        assert!(matches!(
            extract(None).await,
            Err(AppError::Unauthorized { .. })
        ));
    }

    #[tokio::test]
    async fn test_non_numeric_header_is_unauthorized() {
        assert!(matches!(
            extract(Some("alice")).await,
            Err(AppError::Unauthorized { .. })
        ));
    }
}
