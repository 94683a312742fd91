//! Registration handlers: capacity-safe join and idempotent leave.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use campus_core::error::CoreError;
use campus_core::event::STATUS_APPROVED;
use campus_core::roles;
use campus_core::types::DbId;
use campus_db::models::event::Event;
use campus_db::models::registration::RegistrationOutcome;
use campus_db::repositories::{EventRepo, RegistrationRepo};
use campus_notify::bus::EVENT_FULL;
use campus_notify::LifecycleEvent;
use serde_json::json;

use super::{event_not_found, resolve_scope};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Load the event the caller is allowed to act on. Students go through
/// the department visibility predicate; privileged callers see the whole
/// college.
async fn load_registerable(
    state: &AppState,
    user: &AuthUser,
    id: DbId,
) -> AppResult<Event> {
    let scope = resolve_scope(state, user).await?;

    let found = if roles::is_privileged(&user.roles) {
        EventRepo::find_in_college(&state.pool, id, &scope.college_id).await?
    } else {
        EventRepo::find_visible(&state.pool, id, &scope.college_id, &scope.department).await?
    };
    found.ok_or_else(|| event_not_found(id))
}

/// POST /events/{id}/register -- join an event.
///
/// Capacity and uniqueness are enforced inside one serializable
/// transaction in the repository; this handler only maps the outcome.
/// `EVENT_FULL` and `ALREADY_REGISTERED` are distinct 409s so clients can
/// tell "try another event" from "you are already in".
pub async fn register(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let event = load_registerable(&state, &user, id).await?;

    if event.moderation_status != STATUS_APPROVED {
        return Err(AppError::Core(CoreError::InvalidState(
            "Event is not open for registration".into(),
        )));
    }

    let outcome =
        RegistrationRepo::register(&state.pool, event.id, &user.user_id, &user.name).await?;

    match outcome {
        RegistrationOutcome::Registered {
            registration,
            now_full,
        } => {
            tracing::info!(event_id = event.id, user_id = %user.user_id, "Registered");
            if now_full {
                state.notify.publish(
                    LifecycleEvent::new(EVENT_FULL, event.id, &event.college_id)
                        .with_actor(&user.user_id)
                        .with_payload(json!({
                            "title": event.title,
                            "capacity": event.capacity,
                        })),
                );
            }
            Ok((
                StatusCode::CREATED,
                Json(DataResponse { data: registration }),
            )
                .into_response())
        }
        RegistrationOutcome::Full => Ok((
            StatusCode::CONFLICT,
            Json(json!({
                "error": "Event has reached its capacity",
                "code": "EVENT_FULL",
            })),
        )
            .into_response()),
        RegistrationOutcome::AlreadyRegistered => Ok((
            StatusCode::CONFLICT,
            Json(json!({
                "error": "Already registered for this event",
                "code": "ALREADY_REGISTERED",
            })),
        )
            .into_response()),
    }
}

/// DELETE /events/{id}/register -- leave an event. Idempotent: removing
/// a registration that does not exist still succeeds.
pub async fn unregister(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let event = load_registerable(&state, &user, id).await?;

    let removed = RegistrationRepo::unregister(&state.pool, event.id, &user.user_id).await?;
    if removed > 0 {
        tracing::info!(event_id = event.id, user_id = %user.user_id, "Unregistered");
    }
    Ok(StatusCode::NO_CONTENT)
}
