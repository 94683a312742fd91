pub mod audit;
pub mod events;
pub mod export;
pub mod health;
pub mod moderation;
pub mod registration;

use campus_core::error::CoreError;
use campus_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::scope::Scope;
use crate::state::AppState;

/// Resolve the caller's (college, department) scope or fail the request.
pub(crate) async fn resolve_scope(state: &AppState, user: &AuthUser) -> AppResult<Scope> {
    state
        .scope
        .resolve(&user.user_id)
        .await
        .map_err(AppError::Core)
}

/// The uniform miss for events outside the caller's scope. Always
/// NotFound, never Forbidden: existence must not leak across colleges.
pub(crate) fn event_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Event", id })
}
