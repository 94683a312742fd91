//! Admin audit log query endpoint.

use axum::extract::{Query, State};
use axum::Json;
use campus_core::types::DbId;
use campus_db::models::audit::{AuditLog, AuditQuery};
use campus_db::repositories::AuditLogRepo;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::resolve_scope;
use crate::error::AppResult;
use crate::middleware::rbac::RequireModerator;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for GET /admin/audit-logs.
#[derive(Debug, Deserialize)]
pub struct AuditLogParams {
    pub admin_id: Option<String>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    /// RFC 3339 window bounds, inclusive.
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /admin/audit-logs -- the moderation trail for the caller's college.
pub async fn list_audit_logs(
    RequireModerator(user): RequireModerator,
    State(state): State<AppState>,
    Query(params): Query<AuditLogParams>,
) -> AppResult<Json<DataResponse<Vec<AuditLog>>>> {
    let scope = resolve_scope(&state, &user).await?;

    let query = AuditQuery {
        admin_id: params.admin_id,
        action: params.action,
        entity_type: params.entity_type,
        entity_id: params.entity_id,
        from: params.from,
        to: params.to,
        limit: params.limit,
        offset: params.offset,
    };
    let logs = AuditLogRepo::query(&state.pool, &scope.college_id, &query).await?;
    Ok(Json(DataResponse { data: logs }))
}
