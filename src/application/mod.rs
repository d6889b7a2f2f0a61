//! Application layer services implementing business logic.
//!
//! Services consume repository traits and provide the API used by HTTP handlers.
//!
//! - [`services::shortener_service::ShortenerService`] - Short link creation,
//!   resolution, listing and batched deletion

pub mod services;
