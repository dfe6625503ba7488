// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    middleware::auth::AuthenticatedUser,
    models::auth::{Role, User},
};

/// A role check usable as a type parameter of [`RequireRole`].
pub trait RoleRequirement: Send + Sync + 'static {
    fn allows(role: Role) -> bool;
    fn denial() -> &'static str;
}

/// Extractor that yields the authenticated user if their role satisfies `R`.
/// Must run behind `auth_guard`.
pub struct RequireRole<R>(pub User, pub PhantomData<R>);

impl<R, S> FromRequestParts<S> for RequireRole<R>
where
    R: RoleRequirement,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;

        if !R::allows(user.role) {
            tracing::warn!(user_id = %user.id, role = ?user.role, "role check failed");
            return Err(AppError::Forbidden(R::denial().to_string()));
        }

        Ok(RequireRole(user, PhantomData))
    }
}

// ---
// Role requirements
// ---

pub struct AdminOnly;
impl RoleRequirement for AdminOnly {
    fn allows(role: Role) -> bool {
        role.is_admin()
    }
    fn denial() -> &'static str {
        "Admin access required"
    }
}

pub struct PosterOrAdmin;
impl RoleRequirement for PosterOrAdmin {
    fn allows(role: Role) -> bool {
        role.can_publish_shops()
    }
    fn denial() -> &'static str {
        "Only posters and admins can manage shops"
    }
}
