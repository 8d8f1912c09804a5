use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use crate::{error::ApiError, state::AppState};

pub const USER_HEADER: &str = "X-User-Id";

/// Caller identity, set by the authenticating proxy in front of this service.
pub struct CurrentUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| CurrentUser(id.to_string()))
            .ok_or(ApiError::Unauthorized)
    }
}

/// Passes only requests carrying `Authorization: Bearer <admin_token>`.
pub struct AdminAuth;

#[async_trait]
impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if is_admin(&parts.headers, &state.admin_token) {
            Ok(AdminAuth)
        } else {
            Err(ApiError::Forbidden("Invalid admin token".into()))
        }
    }
}

pub fn is_admin(headers: &HeaderMap, admin_token: &str) -> bool {
    let expected = format!("Bearer {}", admin_token);
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .is_some_and(|h| h == expected)
}
