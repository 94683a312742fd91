//! Best-effort audit trail writer.
//!
//! Every privileged mutation records an entry; a failed write is logged
//! and swallowed so it can never abort the admin action that triggered it.

use campus_core::types::DbId;
use campus_db::models::audit::CreateAuditLog;
use campus_db::repositories::AuditLogRepo;
use campus_db::DbPool;

use crate::middleware::auth::AuthUser;

/// Record an administrative mutation. Never fails.
#[allow(clippy::too_many_arguments)]
pub async fn record(
    pool: &DbPool,
    admin: &AuthUser,
    college_id: &str,
    action: &str,
    entity_type: &str,
    entity_id: Option<DbId>,
    before: Option<serde_json::Value>,
    after: Option<serde_json::Value>,
    reason: Option<String>,
) {
    let entry = CreateAuditLog {
        admin_id: admin.user_id.clone(),
        admin_name: admin.name.clone(),
        action: action.to_string(),
        entity_type: entity_type.to_string(),
        entity_id,
        before,
        after,
        reason,
        college_id: college_id.to_string(),
    };

    if let Err(e) = AuditLogRepo::insert(pool, &entry).await {
        tracing::error!(
            action,
            entity_type,
            entity_id = ?entity_id,
            error = %e,
            "Audit log write failed; continuing"
        );
    }
}

/// Snapshot an entity for a before/after audit column. Serialization
/// failures degrade to `null` rather than aborting the caller.
pub fn snapshot<T: serde::Serialize>(value: &T) -> Option<serde_json::Value> {
    serde_json::to_value(value).ok()
}
