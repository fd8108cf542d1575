//! Caller identity
//!
//! Uploads carry an HS256 JWT in the `Authorization: Bearer` header. The
//! token's subject is the caller's user id.

pub mod jwt;

pub use jwt::{AccessClaims, JwtIdentityProvider};

use axum::http::{header::AUTHORIZATION, HeaderMap};

/// Bearer credential from the `Authorization` header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}
