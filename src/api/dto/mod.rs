//! Data Transfer Objects for API requests and responses.
//!
//! DTOs use Serde for JSON (de)serialization and `validator` for input checks.

pub mod shorten;
pub mod user_urls;
