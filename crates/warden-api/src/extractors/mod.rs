//! Custom Axum extractors.

pub mod auth;
pub mod client;
pub mod json;
pub mod query;

pub use auth::{AuthUser, BearerToken, MaybeBearer, RequestContext};
pub use client::ClientInfo;
pub use json::ValidatedJson;
pub use query::ValidatedQuery;
