//! Registration roster export (CSV).

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use campus_core::export::build_csv;
use campus_core::types::DbId;
use campus_db::repositories::{EventRepo, RegistrationRepo};

use super::{event_not_found, resolve_scope};
use crate::error::AppResult;
use crate::middleware::rbac::RequirePrivileged;
use crate::state::AppState;

const CSV_HEADERS: &[&str] = &["registration_id", "user_id", "user_name", "joined_at"];

/// GET /events/{id}/export -- download the registration roster as CSV.
///
/// The BOM keeps spreadsheet tools from mis-sniffing the encoding.
pub async fn export_registrations(
    RequirePrivileged(user): RequirePrivileged,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let scope = resolve_scope(&state, &user).await?;

    let event = EventRepo::find_in_college(&state.pool, id, &scope.college_id)
        .await?
        .ok_or_else(|| event_not_found(id))?;

    let registrations = RegistrationRepo::list_for_event(&state.pool, event.id).await?;
    let rows: Vec<Vec<String>> = registrations
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.user_id.clone(),
                r.user_name.clone(),
                r.joined_at.to_rfc3339(),
            ]
        })
        .collect();

    let body = build_csv(CSV_HEADERS, &rows);
    tracing::info!(
        event_id = event.id,
        rows = registrations.len(),
        "Roster exported"
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"event-{}-registrations.csv\"", event.id),
            ),
        ],
        body,
    )
        .into_response())
}
