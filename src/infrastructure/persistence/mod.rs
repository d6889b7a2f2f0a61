//! Repository implementations.
//!
//! - [`PgUrlRepository`] - PostgreSQL storage via SQLx
//! - [`InMemoryUrlRepository`] - Process-local storage, optionally snapshotted to disk

pub mod memory_url_repository;
pub mod pg_url_repository;

pub use memory_url_repository::InMemoryUrlRepository;
pub use pg_url_repository::PgUrlRepository;
