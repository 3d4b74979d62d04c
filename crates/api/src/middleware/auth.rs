//! Authentication extractors.
//!
//! Route handlers declare their auth requirement through the extractor they
//! take: [`CurrentUser`] for any signed-in user, [`RequireAdmin`] for admin
//! endpoints. Both verify the bearer token locally; no database round trip.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use shoebox_core::UserId;

use crate::error::AppError;
use crate::services::auth::{Claims, verify_token};
use crate::state::AppState;

/// Extractor for an authenticated user.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(user: CurrentUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.claims.email)
/// }
/// ```
pub struct CurrentUser {
    pub claims: Claims,
}

impl CurrentUser {
    /// The authenticated user's id.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.claims.user_id()
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

        let claims = verify_token(token, state.jwt_keys()).map_err(AppError::Auth)?;

        crate::error::set_sentry_user(&claims.sub, Some(&claims.email));

        Ok(Self { claims })
    }
}

/// Extractor for an authenticated admin.
///
/// Rejects non-admin users with 403 rather than 404, matching the rest of
/// the admin surface.
pub struct RequireAdmin(pub Claims);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser { claims } = CurrentUser::from_request_parts(parts, state).await?;

        if !claims.role.is_admin() {
            return Err(AppError::Forbidden(
                "Admin privileges required".to_string(),
            ));
        }

        Ok(Self(claims))
    }
}

/// Pull the token out of an `Authorization: Bearer ...` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: &str) -> Parts {
        let request = Request::builder()
            .uri("/")
            .header(header::AUTHORIZATION, value)
            .body(())
            .unwrap();
        request.into_parts().0
    }

    #[test]
    fn test_bearer_token_extracts_value() {
        let parts = parts_with_auth("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        let parts = parts_with_auth("Basic dXNlcjpwYXNz");
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_bearer_token_rejects_empty() {
        let parts = parts_with_auth("Bearer ");
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_bearer_token_missing_header() {
        let request = Request::builder().uri("/").body(()).unwrap();
        let (parts, ()) = request.into_parts();
        assert_eq!(bearer_token(&parts), None);
    }
}
