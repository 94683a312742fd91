//! Approval flow bookkeeping record (one-to-one with student-authored
//! events).

use campus_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Row from `approval_flows`.
///
/// At most one of `approved_at` / `rejected_at` is ever set; once either
/// is, the flow is terminal and further moderation writes are guarded
/// no-ops at the SQL level.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ApprovalFlow {
    pub id: DbId,
    pub event_id: DbId,
    pub assigned_to: Option<String>,
    pub assigned_to_name: Option<String>,
    pub submitted_at: Timestamp,
    pub approved_at: Option<Timestamp>,
    pub approved_by: Option<String>,
    pub approved_by_name: Option<String>,
    pub rejected_at: Option<Timestamp>,
    pub rejected_by: Option<String>,
    pub rejected_by_name: Option<String>,
    pub rejection_reason: Option<String>,
    pub is_escalated: bool,
    pub escalated_at: Option<Timestamp>,
    pub escalated_to: Option<String>,
    pub escalated_to_name: Option<String>,
    pub mentor_assigned: bool,
    pub mentor_name: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A pending flow joined with the columns the escalation sweep needs.
#[derive(Debug, Clone, FromRow)]
pub struct PendingFlow {
    pub flow_id: DbId,
    pub event_id: DbId,
    pub college_id: String,
    pub event_title: String,
    pub submitted_at: Timestamp,
}
