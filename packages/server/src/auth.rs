//! Bearer-token check for write endpoints.

use actix_web::{HttpRequest, http::header};

use crate::error::ApiError;

/// Accepts the request only if it carries `Authorization: Bearer <token>`
/// matching `expected`. With no configured token every request is refused.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] when the header is missing, malformed,
/// or does not match.
pub fn require_bearer(req: &HttpRequest, expected: Option<&str>) -> Result<(), ApiError> {
    let Some(expected) = expected else {
        return Err(ApiError::Unauthorized);
    };

    let presented = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    match presented {
        Some(token) if constant_time_eq(token.as_bytes(), expected.as_bytes()) => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
