//! Event entity model and write DTOs.

use campus_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full event row from the `events` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Event {
    pub id: DbId,
    /// Tenant partition; every read and write is scoped to it.
    pub college_id: String,
    pub author_id: String,
    pub author_name: String,
    /// Author's highest role at creation time, denormalized.
    pub author_role: String,
    pub title: String,
    pub description: String,
    pub start_at: Timestamp,
    pub end_at: Timestamp,
    pub event_type: String,
    pub mode: String,
    pub location: Option<String>,
    pub meeting_url: Option<String>,
    /// NULL means unlimited.
    pub capacity: Option<i32>,
    pub visible_to_all_depts: bool,
    pub departments: Vec<String>,
    pub tags: Vec<String>,
    pub moderation_status: String,
    pub monitor_id: Option<String>,
    pub monitor_name: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Soft-delete marker used by admin tooling; archived events are
    /// excluded from every listing and fetch.
    pub archived_at: Option<Timestamp>,
}

/// Insert DTO. Fields are already validated and normalized by the caller
/// (times resolved, visibility normalized, enums checked).
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub college_id: String,
    pub author_id: String,
    pub author_name: String,
    pub author_role: String,
    pub title: String,
    pub description: String,
    pub start_at: Timestamp,
    pub end_at: Timestamp,
    pub event_type: String,
    pub mode: String,
    pub location: Option<String>,
    pub meeting_url: Option<String>,
    pub capacity: Option<i32>,
    pub visible_to_all_depts: bool,
    pub departments: Vec<String>,
    pub tags: Vec<String>,
    pub moderation_status: String,
}

/// Fully merged content fields for an update. The handler loads the row,
/// applies the partial patch, re-validates, and writes the merged result;
/// identity and moderation columns are never touched here.
#[derive(Debug, Clone)]
pub struct EventContentUpdate {
    pub title: String,
    pub description: String,
    pub start_at: Timestamp,
    pub end_at: Timestamp,
    pub event_type: String,
    pub mode: String,
    pub location: Option<String>,
    pub meeting_url: Option<String>,
    pub capacity: Option<i32>,
    pub visible_to_all_depts: bool,
    pub departments: Vec<String>,
    pub tags: Vec<String>,
}

/// Filters for privileged listings.
#[derive(Debug, Clone, Default)]
pub struct EventListFilter {
    pub moderation_status: Option<String>,
    pub event_type: Option<String>,
    pub limit: i64,
    pub offset: i64,
}
