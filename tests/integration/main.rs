//! HTTP-level tests against the full router over in-memory backends.

mod auth_test;
mod helpers;
mod permission_test;
mod session_test;
