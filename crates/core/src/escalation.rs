//! Escalation decision logic for stalled approval flows.
//!
//! Pure functions only; the sweep loop in `campus-api` and the guarded
//! UPDATE in `campus-db` handle the concurrency side.

use chrono::Duration;

use crate::types::Timestamp;

/// Default delay before a pending flow escalates, used when a college has
/// no policy row.
pub const DEFAULT_ESCALATION_DELAY_HOURS: i64 = 72;

/// Whether a flow submitted at `submitted_at` has breached the SLA.
pub fn escalation_due(submitted_at: Timestamp, delay_hours: i64, now: Timestamp) -> bool {
    now >= submitted_at + Duration::hours(delay_hours)
}

/// Resolved reassignment target for an escalated flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationTarget {
    pub id: String,
    pub name: String,
}

/// Pick the escalation target: the first configured backup approver wins
/// (a configured backup is treated as available), falling back to the
/// college's head admin when `auto_escalate_to_head` is set. `None` means
/// the flow stays pending until a future sweep.
pub fn resolve_escalation_target(
    backup_ids: &[String],
    backup_names: &[String],
    auto_escalate_to_head: bool,
    head_admin_id: Option<&str>,
    head_admin_name: Option<&str>,
) -> Option<EscalationTarget> {
    if let Some(id) = backup_ids.first() {
        let name = backup_names.first().cloned().unwrap_or_else(|| id.clone());
        return Some(EscalationTarget {
            id: id.clone(),
            name,
        });
    }
    if auto_escalate_to_head {
        if let Some(id) = head_admin_id {
            return Some(EscalationTarget {
                id: id.to_string(),
                name: head_admin_name.unwrap_or(id).to_string(),
            });
        }
    }
    None
}
