//! Append-only audit log entities.

use campus_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Row from `audit_logs`. Never updated or deleted by this core.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AuditLog {
    pub id: DbId,
    pub admin_id: String,
    pub admin_name: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<DbId>,
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
    pub reason: Option<String>,
    pub college_id: String,
    pub created_at: Timestamp,
}

/// Insert DTO for a single audit entry.
#[derive(Debug, Clone)]
pub struct CreateAuditLog {
    pub admin_id: String,
    pub admin_name: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<DbId>,
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
    pub reason: Option<String>,
    pub college_id: String,
}

/// Filters for the admin audit query endpoint.
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    pub admin_id: Option<String>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
