//! Domain layer containing business entities and the deletion pipeline.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`deletion_worker`] - Batched asynchronous deletion worker
//!
//! # Deletion Flow
//!
//! 1. HTTP handler receives the ids an owner wants removed
//! 2. [`entities::UrlToDelete`] requests are sent to a bounded channel
//! 3. [`deletion_worker::run_deletion_worker`] groups them into batches
//! 4. Batches are applied via [`repositories::UrlRepository::delete_batch`]

pub mod deletion_worker;
pub mod entities;
pub mod repositories;
