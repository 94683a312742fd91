//! Read-only access to per-college escalation policies. The rows are
//! maintained by the external admin configuration surface.

use sqlx::PgPool;

use crate::models::escalation_policy::EscalationPolicy;

/// Column list for `escalation_policies` queries.
const COLUMNS: &str = "\
    id, college_id, escalation_delay_hours, backup_approver_ids, \
    backup_approver_names, auto_escalate_to_head, head_admin_id, \
    head_admin_name, created_at, updated_at";

pub struct EscalationPolicyRepo;

impl EscalationPolicyRepo {
    pub async fn find_by_college(
        pool: &PgPool,
        college_id: &str,
    ) -> Result<Option<EscalationPolicy>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM escalation_policies WHERE college_id = $1");
        sqlx::query_as::<_, EscalationPolicy>(&query)
            .bind(college_id)
            .fetch_optional(pool)
            .await
    }
}
