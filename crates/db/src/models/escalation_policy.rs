//! Per-college escalation configuration, owned by the external admin
//! surface and read-only from this core.

use campus_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EscalationPolicy {
    pub id: DbId,
    pub college_id: String,
    pub escalation_delay_hours: i32,
    pub backup_approver_ids: Vec<String>,
    /// Display names paired index-wise with `backup_approver_ids`.
    pub backup_approver_names: Vec<String>,
    pub auto_escalate_to_head: bool,
    pub head_admin_id: Option<String>,
    pub head_admin_name: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
