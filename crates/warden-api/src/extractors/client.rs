//! Caller network identity.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::request::Parts;

use crate::state::AppState;

/// Value used when a header or the peer address is unavailable.
pub const UNKNOWN: &str = "unknown";

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Client IP and User-Agent of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    /// Socket peer, or the forwarded client when the peer is a trusted proxy.
    pub ip: String,
    /// `User-Agent` header, empty when absent.
    pub user_agent: String,
}

impl ClientInfo {
    /// Read client identity from request parts.
    ///
    /// `X-Forwarded-For` is only read when the socket peer is listed in
    /// `trusted_proxies`; anyone else could put arbitrary addresses there.
    pub fn resolve(parts: &Parts, trusted_proxies: &[IpAddr]) -> Self {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        let ip = match peer {
            Some(peer) if trusted_proxies.contains(&peer) => {
                forwarded_client(&parts.headers, trusted_proxies)
                    .unwrap_or(peer)
                    .to_string()
            }
            Some(peer) => peer.to_string(),
            None => UNKNOWN.to_string(),
        };

        let user_agent = parts
            .headers
            .get(axum::http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        Self { ip, user_agent }
    }
}

/// Nearest hop that is not one of our proxies, walking the chain right to left.
///
/// Stops at the first unparseable hop: anything to its left was written by
/// an untrusted party.
fn forwarded_client(headers: &HeaderMap, trusted_proxies: &[IpAddr]) -> Option<IpAddr> {
    let values: Vec<&str> = headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    for hop in values.iter().rev().flat_map(|v| v.rsplit(',')) {
        let ip: IpAddr = hop.trim().parse().ok()?;
        if !trusted_proxies.contains(&ip) {
            return Some(ip);
        }
    }
    None
}

impl FromRequestParts<AppState> for ClientInfo {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::resolve(parts, &state.config.server.trusted_proxies))
    }
}
