//! Repository for the `approval_flows` table.
//!
//! Every terminal-state mutation is guarded in SQL (`approved_at IS NULL
//! AND rejected_at IS NULL`) so a finished flow can never be double-counted
//! and concurrent escalation sweeps cannot both fire for the same flow:
//! the loser of the race simply affects zero rows.

use campus_core::types::DbId;
use sqlx::PgPool;

use crate::models::approval_flow::{ApprovalFlow, PendingFlow};

/// Column list for `approval_flows` queries.
const COLUMNS: &str = "\
    id, event_id, assigned_to, assigned_to_name, submitted_at, \
    approved_at, approved_by, approved_by_name, \
    rejected_at, rejected_by, rejected_by_name, rejection_reason, \
    is_escalated, escalated_at, escalated_to, escalated_to_name, \
    mentor_assigned, mentor_name, created_at, updated_at";

pub struct ApprovalFlowRepo;

impl ApprovalFlowRepo {
    /// Create the flow record accompanying a student-authored event.
    pub async fn create(
        pool: &PgPool,
        event_id: DbId,
        assigned_to: Option<&str>,
        assigned_to_name: Option<&str>,
    ) -> Result<ApprovalFlow, sqlx::Error> {
        let query = format!(
            "INSERT INTO approval_flows (event_id, assigned_to, assigned_to_name)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApprovalFlow>(&query)
            .bind(event_id)
            .bind(assigned_to)
            .bind(assigned_to_name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_event(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Option<ApprovalFlow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM approval_flows WHERE event_id = $1");
        sqlx::query_as::<_, ApprovalFlow>(&query)
            .bind(event_id)
            .fetch_optional(pool)
            .await
    }

    /// Record an approval. Guarded against a rejected flow; a repeat
    /// approval keeps the original `approved_at`/`approved_by` and only
    /// refreshes the mentor fields. Returns whether a row was touched.
    pub async fn mark_approved(
        pool: &PgPool,
        event_id: DbId,
        approved_by: &str,
        approved_by_name: &str,
        mentor_name: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE approval_flows SET
                approved_at = COALESCE(approved_at, now()),
                approved_by = COALESCE(approved_by, $2),
                approved_by_name = COALESCE(approved_by_name, $3),
                mentor_assigned = mentor_assigned OR $4 IS NOT NULL,
                mentor_name = COALESCE($4, mentor_name),
                updated_at = now()
             WHERE event_id = $1 AND rejected_at IS NULL",
        )
        .bind(event_id)
        .bind(approved_by)
        .bind(approved_by_name)
        .bind(mentor_name)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a rejection. A terminal flow is left untouched.
    pub async fn mark_rejected(
        pool: &PgPool,
        event_id: DbId,
        rejected_by: &str,
        rejected_by_name: &str,
        reason: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE approval_flows SET
                rejected_at = now(),
                rejected_by = $2,
                rejected_by_name = $3,
                rejection_reason = $4,
                updated_at = now()
             WHERE event_id = $1 AND approved_at IS NULL AND rejected_at IS NULL",
        )
        .bind(event_id)
        .bind(rejected_by)
        .bind(rejected_by_name)
        .bind(reason)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Hand off review responsibility without changing moderation status.
    /// Only a live (non-terminal) flow can be reassigned.
    pub async fn reassign(
        pool: &PgPool,
        event_id: DbId,
        assigned_to: &str,
        assigned_to_name: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE approval_flows SET
                assigned_to = $2,
                assigned_to_name = $3,
                updated_at = now()
             WHERE event_id = $1 AND approved_at IS NULL AND rejected_at IS NULL",
        )
        .bind(event_id)
        .bind(assigned_to)
        .bind(assigned_to_name)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Flows past their college's escalation SLA: non-terminal, not yet
    /// escalated, older than the per-college delay (or `default_delay_hours`
    /// where no policy row exists).
    pub async fn list_due_for_escalation(
        pool: &PgPool,
        default_delay_hours: i64,
    ) -> Result<Vec<PendingFlow>, sqlx::Error> {
        sqlx::query_as::<_, PendingFlow>(
            "SELECT f.id AS flow_id, f.event_id, e.college_id,
                    e.title AS event_title, f.submitted_at
             FROM approval_flows f
             JOIN events e ON e.id = f.event_id
             LEFT JOIN escalation_policies p ON p.college_id = e.college_id
             WHERE f.is_escalated = FALSE
               AND f.approved_at IS NULL
               AND f.rejected_at IS NULL
               AND e.archived_at IS NULL
               AND now() >= f.submitted_at
                   + make_interval(hours => COALESCE(p.escalation_delay_hours, $1::int))
             ORDER BY f.submitted_at ASC",
        )
        .bind(default_delay_hours as i32)
        .fetch_all(pool)
        .await
    }

    /// Escalate a flow and reassign it to the target. The guard makes the
    /// write a no-op if another sweep got there first or the flow resolved
    /// meanwhile; `false` means nothing was changed and nothing should be
    /// notified.
    pub async fn mark_escalated(
        pool: &PgPool,
        flow_id: DbId,
        escalated_to: &str,
        escalated_to_name: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE approval_flows SET
                is_escalated = TRUE,
                escalated_at = now(),
                escalated_to = $2,
                escalated_to_name = $3,
                assigned_to = $2,
                assigned_to_name = $3,
                updated_at = now()
             WHERE id = $1
               AND is_escalated = FALSE
               AND approved_at IS NULL
               AND rejected_at IS NULL",
        )
        .bind(flow_id)
        .bind(escalated_to)
        .bind(escalated_to_name)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
