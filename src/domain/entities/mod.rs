//! Core domain entities.
//!
//! - [`ShortenedUrl`] - A stored short link (soft-deletable)
//! - [`UrlToShorten`] - Input for creating a short link
//! - [`UrlToDelete`] - Owner-scoped deletion request consumed by the deletion worker

pub mod shortened_url;

pub use shortened_url::{ShortenedUrl, UrlToDelete, UrlToShorten};
