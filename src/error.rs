//! Application error type and its HTTP representation.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload returned to API clients.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// Errors surfaced by services and repositories.
///
/// `NotFound`, `Gone` and `Conflict` are ordinary domain outcomes.
/// `Unavailable` signals a transient backend failure; its message never
/// contains the raw backend error.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },
    #[error("{message}")]
    Unauthorized { message: String, details: Value },
    #[error("{message}")]
    NotFound { message: String, details: Value },
    #[error("{message}")]
    Gone { message: String, details: Value },
    #[error("{message}")]
    Conflict { message: String, details: Value },
    #[error("{message}")]
    Unavailable { message: String, details: Value },
    #[error("{message}")]
    Configuration { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn gone(message: impl Into<String>, details: Value) -> Self {
        Self::Gone {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::Unavailable {
            message: message.into(),
            details,
        }
    }
    pub fn configuration(message: impl Into<String>, details: Value) -> Self {
        Self::Configuration {
            message: message.into(),
            details,
        }
    }

    /// Stable error code used in API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::Unauthorized { .. } => "unauthorized",
            Self::NotFound { .. } => "not_found",
            Self::Gone { .. } => "gone",
            Self::Conflict { .. } => "conflict",
            Self::Unavailable { .. } => "unavailable",
            Self::Configuration { .. } => "configuration_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Gone { .. } => StatusCode::GONE,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn details(&self) -> &Value {
        match self {
            Self::Validation { details, .. }
            | Self::Unauthorized { details, .. }
            | Self::NotFound { details, .. }
            | Self::Gone { details, .. }
            | Self::Conflict { details, .. }
            | Self::Unavailable { details, .. }
            | Self::Configuration { details, .. } => details,
        }
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        ErrorInfo {
            code: self.code(),
            message: self.to_string(),
            details: self.details().clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }

        if matches!(e, sqlx::Error::RowNotFound) {
            return AppError::not_found("Record not found", json!({}));
        }

        tracing::error!(error = %e, "Database error");
        AppError::unavailable("Storage is temporarily unavailable", json!({}))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<&str> = field_errors.keys().map(|k| k.as_ref()).collect();
        fields.sort_unstable();
        AppError::bad_request("Validation failed", json!({ "fields": fields }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::bad_request("x", json!({})), StatusCode::BAD_REQUEST),
            (AppError::unauthorized("x", json!({})), StatusCode::UNAUTHORIZED),
            (AppError::not_found("x", json!({})), StatusCode::NOT_FOUND),
            (AppError::gone("x", json!({})), StatusCode::GONE),
            (AppError::conflict("x", json!({})), StatusCode::CONFLICT),
            (
                AppError::unavailable("x", json!({})),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AppError::configuration("x", json!({})),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.status(), status, "{}", error.code());
        }
    }

    #[test]
    fn test_error_info() {
        let error = AppError::conflict("URL already shortened", json!({ "id": 3 }));
        let info = error.to_error_info();

        assert_eq!(info.code, "conflict");
        assert_eq!(info.message, "URL already shortened");
        assert_eq!(info.details["id"], 3);
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let error = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(error, AppError::NotFound { .. }));
    }

    #[test]
    fn test_backend_error_is_masked() {
        let error = AppError::from(sqlx::Error::PoolTimedOut);

        assert!(matches!(error, AppError::Unavailable { .. }));
        assert_eq!(error.to_string(), "Storage is temporarily unavailable");
    }

    #[derive(validator::Validate)]
    struct Form {
        #[validate(url)]
        link: String,
        #[validate(length(min = 1))]
        name: String,
    }

    #[test]
    fn test_validation_errors_list_fields() {
        use validator::Validate;

        let form = Form {
            link: "nope".to_string(),
            name: String::new(),
        };
        let error = AppError::from(form.validate().unwrap_err());

        assert!(matches!(error, AppError::Validation { .. }));
        assert_eq!(error.details()["fields"], json!(["link", "name"]));
    }
}
