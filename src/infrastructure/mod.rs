//! Infrastructure layer for external integrations.
//!
//! # Modules
//!
//! - [`persistence`] - PostgreSQL and in-memory repository implementations
//! - [`snapshot`] - File snapshots for the in-memory repository

pub mod persistence;
pub mod snapshot;
