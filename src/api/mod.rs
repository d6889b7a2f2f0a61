//! REST API layer for HTTP request/response handling.
//!
//! This layer translates HTTP requests into service calls and formats
//! responses. It holds no business rules of its own apart from answering a
//! shortening conflict with the existing short URL.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`extractors`] - Request extractors (caller identity)
//! - [`handlers`] - HTTP request handlers
//! - [`routes`] - Route configuration and composition

pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod routes;
