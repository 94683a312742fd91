//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role set
//! does not meet the minimum requirement. Use these in route handlers to
//! enforce authorization at the type level. College-level checks still
//! happen in the handler, after scope resolution.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use campus_core::error::CoreError;
use campus_core::roles;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires DEPT_ADMIN or HEAD_ADMIN. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn moderate(RequireModerator(user): RequireModerator) -> AppResult<Json<()>> {
///     // user is guaranteed to hold a moderation role here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireModerator(pub AuthUser);

impl FromRequestParts<AppState> for RequireModerator {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !roles::can_moderate(&user.roles) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Department admin or head admin role required".into(),
            )));
        }
        Ok(RequireModerator(user))
    }
}

/// Requires FACULTY, DEPT_ADMIN, or HEAD_ADMIN. Rejects with 403 otherwise.
pub struct RequirePrivileged(pub AuthUser);

impl FromRequestParts<AppState> for RequirePrivileged {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !roles::is_privileged(&user.roles) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Faculty or admin role required".into(),
            )));
        }
        Ok(RequirePrivileged(user))
    }
}
