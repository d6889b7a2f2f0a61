//! DTOs for the shortening endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to shorten a single URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The original URL to shorten (must be an absolute URL).
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,
}

/// Short URL created for a [`ShortenRequest`].
///
/// Also returned with `409 Conflict`, carrying the existing short URL.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub result: String,
}

/// One entry of a batch shortening request.
///
/// `correlation_id` is opaque to the service and echoed back in the response.
#[derive(Debug, Deserialize, Validate)]
pub struct BatchShortenItem {
    #[validate(length(min = 1, max = 256))]
    pub correlation_id: String,

    #[validate(url(message = "Invalid URL format"))]
    pub original_url: String,
}

/// One entry of a batch shortening response.
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchShortenResult {
    pub correlation_id: String,
    pub short_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorten_request_validation() {
        let valid = ShortenRequest {
            url: "https://example.com/page".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid = ShortenRequest {
            url: "example".to_string(),
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_batch_item_requires_correlation_id() {
        let item = BatchShortenItem {
            correlation_id: String::new(),
            original_url: "https://example.com".to_string(),
        };

        assert!(item.validate().is_err());
    }
}
