//! Event CRUD handlers.
//!
//! Every handler resolves the caller's (college, department) scope first;
//! all reads and writes below that point are scoped to the caller's
//! college. Out-of-scope events surface as NotFound, never Forbidden, so
//! existence does not leak across tenants.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use campus_core::error::CoreError;
use campus_core::event::{self, STATUS_PENDING_REVIEW};
use campus_core::roles;
use campus_core::types::{DbId, Timestamp};
use campus_db::models::event::{Event, EventContentUpdate, EventListFilter, NewEvent};
use campus_db::repositories::{ApprovalFlowRepo, EventRepo, RegistrationRepo};
use campus_notify::bus::EVENT_SUBMITTED;
use campus_notify::LifecycleEvent;
use serde::Deserialize;
use serde_json::json;

use super::{event_not_found, resolve_scope};
use crate::audit;
use crate::eligibility::Eligibility;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for POST /events.
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub start_at: Timestamp,
    pub end_at: Option<Timestamp>,
    pub event_type: String,
    pub mode: String,
    pub location: Option<String>,
    pub meeting_url: Option<String>,
    pub capacity: Option<i32>,
    #[serde(default)]
    pub visible_to_all_depts: bool,
    #[serde(default)]
    pub departments: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request body for PUT /events/{id}. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_at: Option<Timestamp>,
    pub end_at: Option<Timestamp>,
    pub event_type: Option<String>,
    pub mode: Option<String>,
    pub location: Option<String>,
    pub meeting_url: Option<String>,
    pub capacity: Option<i32>,
    pub visible_to_all_depts: Option<bool>,
    pub departments: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}

/// Query parameters for GET /events (privileged filters are ignored for
/// students, whose listing is always APPROVED-only).
#[derive(Debug, Deserialize)]
pub struct ListEventsParams {
    pub status: Option<String>,
    pub event_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Whether the caller may mutate this event: privileged callers in the
/// same college always can; a student only while their own event is still
/// pending review.
fn ensure_can_mutate(user: &AuthUser, event: &Event) -> AppResult<()> {
    if roles::is_privileged(&user.roles) {
        return Ok(());
    }
    if event.author_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the author or an administrator may modify this event".into(),
        )));
    }
    if event.moderation_status != STATUS_PENDING_REVIEW {
        return Err(AppError::Core(CoreError::InvalidState(
            "Events can only be edited by their author while pending review".into(),
        )));
    }
    Ok(())
}

/// Run the full validation pipeline over a complete set of content
/// fields, returning them normalized.
#[allow(clippy::too_many_arguments, clippy::type_complexity)]
fn validate_content(
    title: &str,
    description: &str,
    start_at: Timestamp,
    end_at: Option<Timestamp>,
    event_type: &str,
    mode: &str,
    location: Option<&str>,
    meeting_url: Option<&str>,
    capacity: Option<i32>,
    visible_to_all_depts: bool,
    departments: Vec<String>,
) -> Result<(Timestamp, Timestamp, bool, Vec<String>), AppError> {
    let validation = |msg: String| AppError::Core(CoreError::Validation(msg));

    event::validate_title(title).map_err(validation)?;
    event::validate_description(description).map_err(validation)?;
    event::validate_event_type(event_type).map_err(validation)?;
    event::validate_mode(mode).map_err(validation)?;
    event::validate_mode_fields(mode, location, meeting_url).map_err(validation)?;
    event::validate_capacity(capacity).map_err(validation)?;
    let (start, end) = event::resolve_times(start_at, end_at).map_err(validation)?;
    let (all_depts, departments) =
        event::normalize_visibility(visible_to_all_depts, departments).map_err(validation)?;
    Ok((start, end, all_depts, departments))
}

/// GET /events/eligibility -- whether the caller may create events.
pub async fn check_eligibility(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Eligibility>>> {
    let eligibility = if roles::needs_eligibility_check(&user.roles) {
        state.eligibility.check(&user.user_id).await
    } else {
        Eligibility::allowed()
    };
    Ok(Json(DataResponse { data: eligibility }))
}

/// POST /events -- create an event in the caller's college.
pub async fn create_event(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Event>>)> {
    let scope = resolve_scope(&state, &user).await?;

    if roles::needs_eligibility_check(&user.roles) {
        let eligibility = state.eligibility.check(&user.user_id).await;
        if !eligibility.can_create {
            return Err(AppError::Core(CoreError::Forbidden(format!(
                "Not eligible to create events: missing {}",
                eligibility.missing.join(", ")
            ))));
        }
    }

    let (start_at, end_at, visible_to_all_depts, departments) = validate_content(
        &req.title,
        &req.description,
        req.start_at,
        req.end_at,
        &req.event_type,
        &req.mode,
        req.location.as_deref(),
        req.meeting_url.as_deref(),
        req.capacity,
        req.visible_to_all_depts,
        req.departments,
    )?;

    let moderation_status = event::initial_moderation_status(&user.roles);
    let input = NewEvent {
        college_id: scope.college_id.clone(),
        author_id: user.user_id.clone(),
        author_name: user.name.clone(),
        author_role: roles::primary_role(&user.roles).to_string(),
        title: req.title,
        description: req.description,
        start_at,
        end_at,
        event_type: req.event_type,
        mode: req.mode,
        location: req.location,
        meeting_url: req.meeting_url,
        capacity: req.capacity,
        visible_to_all_depts,
        departments,
        tags: req.tags,
        moderation_status: moderation_status.to_string(),
    };

    let created = EventRepo::create(&state.pool, &input).await?;
    tracing::info!(
        event_id = created.id,
        college_id = %created.college_id,
        status = %created.moderation_status,
        "Event created"
    );

    if created.moderation_status == STATUS_PENDING_REVIEW {
        // Bookkeeping record for moderators; the event row is already the
        // source of truth, so a failure here must not undo the creation.
        if let Err(e) = ApprovalFlowRepo::create(&state.pool, created.id, None, None).await {
            tracing::error!(
                event_id = created.id,
                error = %e,
                "Approval flow creation failed; event remains pending"
            );
        }
        state.notify.publish(
            LifecycleEvent::new(EVENT_SUBMITTED, created.id, &created.college_id)
                .with_actor(&user.user_id)
                .with_payload(json!({ "title": created.title })),
        );
    }

    if roles::is_privileged(&user.roles) {
        audit::record(
            &state.pool,
            &user,
            &scope.college_id,
            "event.create",
            "event",
            Some(created.id),
            None,
            audit::snapshot(&created),
            None,
        )
        .await;
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /events -- list events visible to the caller.
pub async fn list_events(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListEventsParams>,
) -> AppResult<Json<DataResponse<Vec<Event>>>> {
    let scope = resolve_scope(&state, &user).await?;
    let (limit, offset) = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .clamp();

    let events = if roles::is_privileged(&user.roles) {
        if let Some(ref status) = params.status {
            event::validate_moderation_status(status)
                .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
        }
        if let Some(ref event_type) = params.event_type {
            event::validate_event_type(event_type)
                .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
        }
        let filter = EventListFilter {
            moderation_status: params.status,
            event_type: params.event_type,
            limit,
            offset,
        };
        EventRepo::list_for_college(&state.pool, &scope.college_id, &filter).await?
    } else {
        EventRepo::list_visible(&state.pool, &scope.college_id, &scope.department, limit, offset)
            .await?
    };

    Ok(Json(DataResponse { data: events }))
}

/// GET /events/mine -- events the caller authored (or, for privileged
/// callers, monitors).
pub async fn list_my_events(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Event>>>> {
    let scope = resolve_scope(&state, &user).await?;
    let (limit, offset) = params.clamp();

    let events = if roles::is_privileged(&user.roles) {
        EventRepo::list_authored_or_monitored(
            &state.pool,
            &scope.college_id,
            &user.user_id,
            limit,
            offset,
        )
        .await?
    } else {
        EventRepo::list_by_author(&state.pool, &scope.college_id, &user.user_id, limit, offset)
            .await?
    };

    Ok(Json(DataResponse { data: events }))
}

/// GET /events/{id} -- fetch a single event through the caller's
/// visibility. Students also see their own events regardless of status.
pub async fn get_event(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Event>>> {
    let scope = resolve_scope(&state, &user).await?;

    let found = if roles::is_privileged(&user.roles) {
        EventRepo::find_in_college(&state.pool, id, &scope.college_id).await?
    } else {
        match EventRepo::find_visible(&state.pool, id, &scope.college_id, &scope.department)
            .await?
        {
            Some(event) => Some(event),
            // An author can always follow their own submission.
            None => EventRepo::find_in_college(&state.pool, id, &scope.college_id)
                .await?
                .filter(|e| e.author_id == user.user_id),
        }
    };

    let event = found.ok_or_else(|| event_not_found(id))?;
    Ok(Json(DataResponse { data: event }))
}

/// PUT /events/{id} -- partial content update. The stored row is merged
/// with the patch and the merged result re-validated as a whole, so an
/// update can never leave the event violating a creation invariant.
pub async fn update_event(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(patch): Json<UpdateEventRequest>,
) -> AppResult<Json<DataResponse<Event>>> {
    let scope = resolve_scope(&state, &user).await?;

    let existing = EventRepo::find_in_college(&state.pool, id, &scope.college_id)
        .await?
        .ok_or_else(|| event_not_found(id))?;
    ensure_can_mutate(&user, &existing)?;

    let merged = EventContentUpdate {
        title: patch.title.unwrap_or_else(|| existing.title.clone()),
        description: patch
            .description
            .unwrap_or_else(|| existing.description.clone()),
        start_at: patch.start_at.unwrap_or(existing.start_at),
        end_at: patch.end_at.unwrap_or(existing.end_at),
        event_type: patch
            .event_type
            .unwrap_or_else(|| existing.event_type.clone()),
        mode: patch.mode.unwrap_or_else(|| existing.mode.clone()),
        location: patch.location.or_else(|| existing.location.clone()),
        meeting_url: patch.meeting_url.or_else(|| existing.meeting_url.clone()),
        capacity: patch.capacity.or(existing.capacity),
        visible_to_all_depts: patch
            .visible_to_all_depts
            .unwrap_or(existing.visible_to_all_depts),
        departments: patch
            .departments
            .unwrap_or_else(|| existing.departments.clone()),
        tags: patch.tags.unwrap_or_else(|| existing.tags.clone()),
    };

    let (start_at, end_at, visible_to_all_depts, departments) = validate_content(
        &merged.title,
        &merged.description,
        merged.start_at,
        Some(merged.end_at),
        &merged.event_type,
        &merged.mode,
        merged.location.as_deref(),
        merged.meeting_url.as_deref(),
        merged.capacity,
        merged.visible_to_all_depts,
        merged.departments.clone(),
    )?;
    let merged = EventContentUpdate {
        start_at,
        end_at,
        visible_to_all_depts,
        departments,
        ..merged
    };

    let updated = EventRepo::update_content(&state.pool, id, &merged)
        .await?
        .ok_or_else(|| event_not_found(id))?;
    tracing::info!(event_id = id, "Event content updated");

    if roles::is_privileged(&user.roles) {
        audit::record(
            &state.pool,
            &user,
            &scope.college_id,
            "event.update",
            "event",
            Some(id),
            audit::snapshot(&existing),
            audit::snapshot(&updated),
            None,
        )
        .await;
    }

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /events/{id} -- hard delete. Registrations and the approval
/// flow go with it.
pub async fn delete_event(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let scope = resolve_scope(&state, &user).await?;

    let existing = EventRepo::find_in_college(&state.pool, id, &scope.college_id)
        .await?
        .ok_or_else(|| event_not_found(id))?;
    ensure_can_mutate(&user, &existing)?;

    let registration_count = RegistrationRepo::count_for_event(&state.pool, id).await?;
    EventRepo::delete(&state.pool, id).await?;
    tracing::info!(event_id = id, registration_count, "Event deleted");

    if roles::is_privileged(&user.roles) {
        audit::record(
            &state.pool,
            &user,
            &scope.college_id,
            "event.delete",
            "event",
            Some(id),
            audit::snapshot(&existing),
            None,
            None,
        )
        .await;
    }

    Ok(StatusCode::NO_CONTENT)
}
