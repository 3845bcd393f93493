// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Client identity used as the admission-control key.

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderMap, request::Parts},
};
use std::convert::Infallible;
use std::net::SocketAddr;

/// Identity reported when neither a proxy header nor the peer address is
/// available.
pub const UNKNOWN_IDENTITY: &str = "unknown";

/// The network origin of a request.
///
/// Resolved from, in order:
/// 1. The first entry of `X-Forwarded-For`
/// 2. The peer socket address
/// 3. [`UNKNOWN_IDENTITY`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity(pub String);

impl<S> FromRequestParts<S> for ClientIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve_identity(
            &parts.headers,
            parts.extensions.get::<ConnectInfo<SocketAddr>>(),
        )))
    }
}

fn resolve_identity(headers: &HeaderMap, peer: Option<&ConnectInfo<SocketAddr>>) -> String {
    let forwarded: Option<&str> = headers
        .get("X-Forwarded-For")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty());

    if let Some(first) = forwarded {
        return first.to_string();
    }

    peer.map_or_else(
        || String::from(UNKNOWN_IDENTITY),
        |ConnectInfo(addr)| addr.ip().to_string(),
    )
}
