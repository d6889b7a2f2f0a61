//! Repository trait definitions for the domain layer.
//!
//! Traits define the storage contract; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! via `mockall` for unit tests.
//!
//! - [`UrlRepository`] - Short link storage used by the service and the deletion worker
//! - [`BulkUrlRepository`] - Export/import of the whole store for snapshots

pub mod url_repository;

pub use url_repository::{BulkUrlRepository, UrlRepository};

#[cfg(test)]
pub use url_repository::MockUrlRepository;
