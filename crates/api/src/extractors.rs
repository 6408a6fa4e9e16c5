//! Request extractors.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use pulso_db::entities::{admin, super_admin};

/// Authenticated admin extractor.
#[derive(Debug, Clone)]
pub struct AuthAdmin(pub admin::Model);

impl<S> FromRequestParts<S> for AuthAdmin
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by the auth middleware when the bearer token resolves
        parts
            .extensions
            .get::<admin::Model>()
            .cloned()
            .map(AuthAdmin)
            .ok_or((StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}

/// Authenticated super admin extractor.
#[derive(Debug, Clone)]
pub struct AuthSuperAdmin(pub super_admin::Model);

impl<S> FromRequestParts<S> for AuthSuperAdmin
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<super_admin::Model>()
            .cloned()
            .map(AuthSuperAdmin)
            .ok_or((StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}
