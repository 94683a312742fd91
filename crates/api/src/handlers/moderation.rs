//! Moderation handlers: approve, reject, and reassign pending events.
//!
//! The `events.moderation_status` column is the source of truth; the
//! approval flow row is bookkeeping. Flow writes are best-effort and a
//! failure there never rolls back the status transition. Notifications
//! fire only when the status actually changed, so replaying a moderation
//! request cannot double-notify.

use axum::extract::{Path, State};
use axum::Json;
use campus_core::error::CoreError;
use campus_core::event::{STATUS_APPROVED, STATUS_REJECTED};
use campus_core::types::DbId;
use campus_db::models::event::Event;
use campus_db::repositories::{ApprovalFlowRepo, EventRepo};
use campus_notify::bus::{EVENT_APPROVED, EVENT_REJECTED};
use campus_notify::LifecycleEvent;
use serde::Deserialize;
use serde_json::json;

use super::{event_not_found, resolve_scope};
use crate::audit;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireModerator;
use crate::response::DataResponse;
use crate::state::AppState;

const ACTION_APPROVE: &str = "APPROVE";
const ACTION_REJECT: &str = "REJECT";
const ACTION_ASSIGN: &str = "ASSIGN";

/// Request body for PATCH /events/{id}/moderate.
#[derive(Debug, Deserialize)]
pub struct ModerateRequest {
    /// One of APPROVE, REJECT, ASSIGN.
    pub action: String,
    /// Mentor handed to the organizers on approval (optional).
    pub mentor_id: Option<String>,
    pub mentor_name: Option<String>,
    /// Reason recorded on rejection (optional).
    pub rejection_reason: Option<String>,
    /// Reviewer the flow is handed to on ASSIGN (required there).
    pub assignee_id: Option<String>,
    pub assignee_name: Option<String>,
}

/// PATCH /events/{id}/moderate -- moderator action on an event.
pub async fn moderate_event(
    RequireModerator(user): RequireModerator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(req): Json<ModerateRequest>,
) -> AppResult<Json<DataResponse<Event>>> {
    let scope = resolve_scope(&state, &user).await?;

    // Scope check before anything mutates.
    EventRepo::find_in_college(&state.pool, id, &scope.college_id)
        .await?
        .ok_or_else(|| event_not_found(id))?;

    let event = match req.action.as_str() {
        ACTION_APPROVE => approve(&state, &user, &scope.college_id, id, &req).await?,
        ACTION_REJECT => reject(&state, &user, &scope.college_id, id, &req).await?,
        ACTION_ASSIGN => assign(&state, &user, &scope.college_id, id, &req).await?,
        other => {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Invalid moderation action '{other}'. Must be one of: {ACTION_APPROVE}, {ACTION_REJECT}, {ACTION_ASSIGN}"
            ))));
        }
    };

    Ok(Json(DataResponse { data: event }))
}

async fn approve(
    state: &AppState,
    user: &AuthUser,
    college_id: &str,
    id: DbId,
    req: &ModerateRequest,
) -> AppResult<Event> {
    let (event, prev_status) = EventRepo::approve(
        &state.pool,
        id,
        req.mentor_id.as_deref(),
        req.mentor_name.as_deref(),
    )
    .await?
    .ok_or_else(|| event_not_found(id))?;

    if prev_status == STATUS_REJECTED {
        return Err(AppError::Core(CoreError::InvalidState(
            "A rejected event cannot be approved".into(),
        )));
    }

    // Flow bookkeeping. Re-approval refreshes only the mentor fields.
    if let Err(e) = ApprovalFlowRepo::mark_approved(
        &state.pool,
        id,
        &user.user_id,
        &user.name,
        req.mentor_name.as_deref(),
    )
    .await
    {
        tracing::error!(event_id = id, error = %e, "Approval flow update failed");
    }

    audit::record(
        &state.pool,
        user,
        college_id,
        "event.approve",
        "event",
        Some(id),
        Some(json!({ "moderation_status": prev_status })),
        Some(json!({ "moderation_status": STATUS_APPROVED })),
        None,
    )
    .await;

    // Re-approving an already-approved event is a no-op for subscribers.
    if prev_status != STATUS_APPROVED {
        state.notify.publish(
            LifecycleEvent::new(EVENT_APPROVED, id, &event.college_id)
                .with_actor(&user.user_id)
                .with_payload(json!({
                    "title": event.title,
                    "mentor_name": req.mentor_name,
                })),
        );
        tracing::info!(event_id = id, approved_by = %user.user_id, "Event approved");
    }

    Ok(event)
}

async fn reject(
    state: &AppState,
    user: &AuthUser,
    college_id: &str,
    id: DbId,
    req: &ModerateRequest,
) -> AppResult<Event> {
    let (event, prev_status) = EventRepo::reject(&state.pool, id)
        .await?
        .ok_or_else(|| event_not_found(id))?;

    if let Err(e) = ApprovalFlowRepo::mark_rejected(
        &state.pool,
        id,
        &user.user_id,
        &user.name,
        req.rejection_reason.as_deref(),
    )
    .await
    {
        tracing::error!(event_id = id, error = %e, "Approval flow update failed");
    }

    audit::record(
        &state.pool,
        user,
        college_id,
        "event.reject",
        "event",
        Some(id),
        Some(json!({ "moderation_status": prev_status })),
        Some(json!({ "moderation_status": STATUS_REJECTED })),
        req.rejection_reason.clone(),
    )
    .await;

    if prev_status != STATUS_REJECTED {
        state.notify.publish(
            LifecycleEvent::new(EVENT_REJECTED, id, &event.college_id)
                .with_actor(&user.user_id)
                .with_payload(json!({
                    "title": event.title,
                    "reason": req.rejection_reason,
                })),
        );
        tracing::info!(event_id = id, rejected_by = %user.user_id, "Event rejected");
    }

    Ok(event)
}

async fn assign(
    state: &AppState,
    user: &AuthUser,
    college_id: &str,
    id: DbId,
    req: &ModerateRequest,
) -> AppResult<Event> {
    let assignee_id = req.assignee_id.as_deref().ok_or_else(|| {
        AppError::Core(CoreError::Validation(
            "assignee_id is required for ASSIGN".into(),
        ))
    })?;
    let assignee_name = req.assignee_name.as_deref().unwrap_or(assignee_id);

    let changed = ApprovalFlowRepo::reassign(&state.pool, id, assignee_id, assignee_name).await?;
    if !changed {
        return Err(AppError::Core(CoreError::InvalidState(
            "Event has no active approval flow to assign".into(),
        )));
    }

    audit::record(
        &state.pool,
        user,
        college_id,
        "event.assign_reviewer",
        "approval_flow",
        Some(id),
        None,
        Some(json!({ "assigned_to": assignee_id })),
        None,
    )
    .await;
    tracing::info!(event_id = id, assignee_id, "Approval flow reassigned");

    let event = EventRepo::find_in_college(&state.pool, id, college_id)
        .await?
        .ok_or_else(|| event_not_found(id))?;
    Ok(event)
}
