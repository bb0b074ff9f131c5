//! Custom Axum extractors.
//!
//! - [`AuthUser`]: a caller that must present a valid bearer token
//! - [`MaybeUser`]: a caller that may present one
//!
//! A missing `Authorization` header only matters to [`AuthUser`]. A header
//! that is present but malformed, unknown or expired is rejected with 401 by
//! both user extractors.

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use eventqa_core::access::{AUTHENTICATION_REQUIRED, Credentials};
use eventqa_core::types::User;

const INVALID_TOKEN: &str = "Invalid or expired token";

/// The token of an `Authorization: Bearer <token>` header, if any.
fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let token = value
        .to_str()
        .ok()
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            AppError::unauthorized("Invalid authorization format. Expected 'Bearer <token>'")
        })?;
    Ok(Some(token))
}

async fn resolve_user(parts: &Parts, state: &AppState) -> Result<Option<User>, AppError> {
    let Some(token) = bearer_token(parts)? else {
        return Ok(None);
    };
    match state.identity.authenticate(token).await? {
        Some(user) => Ok(Some(user)),
        None => {
            tracing::debug!("Rejected bearer token");
            Err(AppError::unauthorized(INVALID_TOKEN))
        }
    }
}

/// Signed-in caller.
///
/// # Usage
///
/// ```rust,ignore
/// async fn create_event(AuthUser(user): AuthUser, ...) -> Result<..., AppError> {
///     // user.id is authenticated
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve_user(parts, state)
            .await?
            .map(Self)
            .ok_or_else(|| AppError::unauthorized(AUTHENTICATION_REQUIRED))
    }
}

/// Caller that may or may not be signed in.
///
/// Used on routes that also accept invite tokens.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    /// Combine the signed-in user with an invite token from the request.
    #[must_use]
    pub fn credentials(self, invite_token: Option<String>) -> Credentials {
        Credentials { user_id: self.0.map(|user| user.id), invite_token }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve_user(parts, state).await?))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder();
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).expect("Valid request").into_parts().0
    }

    #[test]
    fn test_missing_header_is_anonymous() {
        assert_eq!(bearer_token(&parts_with(None)).unwrap(), None);
    }

    #[test]
    fn test_bearer_token_is_extracted() {
        assert_eq!(bearer_token(&parts_with(Some("Bearer abc"))).unwrap(), Some("abc"));
    }

    #[test]
    fn test_malformed_header_is_rejected() {
        for header in ["Basic abc", "Bearer ", "bearer abc"] {
            let err = bearer_token(&parts_with(Some(header))).unwrap_err();
            assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED, "{header}");
        }
    }
}
