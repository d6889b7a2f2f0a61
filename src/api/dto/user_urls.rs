//! DTOs for the per-owner URL endpoints.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

/// A link owned by the requesting user.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserUrlResponse {
    pub short_url: String,
    pub original_url: String,
}

/// Ids to delete, sent as a JSON array of strings: `["1", "2"]`.
#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct DeleteUrlsRequest {
    #[serde_as(as = "Vec<DisplayFromStr>")]
    pub ids: Vec<i64>,
}
