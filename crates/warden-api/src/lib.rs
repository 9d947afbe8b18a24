//! # warden-api
//!
//! HTTP API layer for Warden built on Axum.
//!
//! Provides the `/api/v1` endpoints, middleware (authorization, rate
//! limiting, request ids, error reporting, CORS, logging), extractors,
//! DTOs, and error mapping.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
