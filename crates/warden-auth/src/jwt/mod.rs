//! Signed access tokens.

pub mod claims;
pub mod codec;

pub use claims::{Claims, IssuedToken};
pub use codec::TokenCodec;
