//! Repository for the `events` table.
//!
//! Visibility is enforced here, in SQL, so no caller can accidentally leak
//! an event across college or department boundaries: student-scoped reads
//! filter on college, APPROVED status, and department membership; privileged
//! reads filter on college only. Archived rows never surface.

use campus_core::event::STATUS_APPROVED;
use campus_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::{Event, EventContentUpdate, EventListFilter, NewEvent};

/// Column list for `events` queries.
const COLUMNS: &str = "\
    id, college_id, author_id, author_name, author_role, title, description, \
    start_at, end_at, event_type, mode, location, meeting_url, capacity, \
    visible_to_all_depts, departments, tags, moderation_status, \
    monitor_id, monitor_name, created_at, updated_at, archived_at";

/// Provides CRUD and visibility-filtered read operations for events.
pub struct EventRepo;

impl EventRepo {
    /// Insert a new event, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewEvent) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events
                (college_id, author_id, author_name, author_role, title, description,
                 start_at, end_at, event_type, mode, location, meeting_url, capacity,
                 visible_to_all_depts, departments, tags, moderation_status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(&input.college_id)
            .bind(&input.author_id)
            .bind(&input.author_name)
            .bind(&input.author_role)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.start_at)
            .bind(input.end_at)
            .bind(&input.event_type)
            .bind(&input.mode)
            .bind(&input.location)
            .bind(&input.meeting_url)
            .bind(input.capacity)
            .bind(input.visible_to_all_depts)
            .bind(&input.departments)
            .bind(&input.tags)
            .bind(&input.moderation_status)
            .fetch_one(pool)
            .await
    }

    /// Fetch an event within a college without the student visibility
    /// predicate (privileged callers).
    pub async fn find_in_college(
        pool: &PgPool,
        id: DbId,
        college_id: &str,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events
             WHERE id = $1 AND college_id = $2 AND archived_at IS NULL"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(college_id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch an event through the student visibility predicate: same
    /// college, APPROVED, and department-visible. Out-of-scope rows are
    /// indistinguishable from absent ones.
    pub async fn find_visible(
        pool: &PgPool,
        id: DbId,
        college_id: &str,
        department: &str,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events
             WHERE id = $1 AND college_id = $2 AND archived_at IS NULL
               AND moderation_status = $3
               AND (visible_to_all_depts OR $4 = ANY(departments))"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(college_id)
            .bind(STATUS_APPROVED)
            .bind(department)
            .fetch_optional(pool)
            .await
    }

    /// List events visible to a student, newest start first.
    pub async fn list_visible(
        pool: &PgPool,
        college_id: &str,
        department: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events
             WHERE college_id = $1 AND archived_at IS NULL
               AND moderation_status = $2
               AND (visible_to_all_depts OR $3 = ANY(departments))
             ORDER BY start_at DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(college_id)
            .bind(STATUS_APPROVED)
            .bind(department)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// List every event in a college for privileged callers, optionally
    /// narrowed by moderation status and event type.
    pub async fn list_for_college(
        pool: &PgPool,
        college_id: &str,
        filter: &EventListFilter,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let mut conditions = vec![
            "college_id = $1".to_string(),
            "archived_at IS NULL".to_string(),
        ];
        let mut bind_idx = 2u32;
        if filter.moderation_status.is_some() {
            conditions.push(format!("moderation_status = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.event_type.is_some() {
            conditions.push(format!("event_type = ${bind_idx}"));
            bind_idx += 1;
        }

        let query = format!(
            "SELECT {COLUMNS} FROM events
             WHERE {}
             ORDER BY start_at DESC
             LIMIT ${bind_idx} OFFSET ${}",
            conditions.join(" AND "),
            bind_idx + 1
        );

        let mut q = sqlx::query_as::<_, Event>(&query).bind(college_id);
        if let Some(ref status) = filter.moderation_status {
            q = q.bind(status);
        }
        if let Some(ref event_type) = filter.event_type {
            q = q.bind(event_type);
        }
        q.bind(filter.limit).bind(filter.offset).fetch_all(pool).await
    }

    /// List events authored by a principal within a college.
    pub async fn list_by_author(
        pool: &PgPool,
        college_id: &str,
        author_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events
             WHERE college_id = $1 AND author_id = $2 AND archived_at IS NULL
             ORDER BY start_at DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(college_id)
            .bind(author_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Privileged "mine" query: events the principal authored or monitors.
    pub async fn list_authored_or_monitored(
        pool: &PgPool,
        college_id: &str,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events
             WHERE college_id = $1 AND archived_at IS NULL
               AND (author_id = $2 OR monitor_id = $2)
             ORDER BY start_at DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(college_id)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Write the fully merged content fields of an event. Identity and
    /// moderation columns are untouched.
    pub async fn update_content(
        pool: &PgPool,
        id: DbId,
        update: &EventContentUpdate,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!(
            "UPDATE events SET
                title = $2, description = $3, start_at = $4, end_at = $5,
                event_type = $6, mode = $7, location = $8, meeting_url = $9,
                capacity = $10, visible_to_all_depts = $11, departments = $12,
                tags = $13, updated_at = now()
             WHERE id = $1 AND archived_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(&update.title)
            .bind(&update.description)
            .bind(update.start_at)
            .bind(update.end_at)
            .bind(&update.event_type)
            .bind(&update.mode)
            .bind(&update.location)
            .bind(&update.meeting_url)
            .bind(update.capacity)
            .bind(update.visible_to_all_depts)
            .bind(&update.departments)
            .bind(&update.tags)
            .fetch_optional(pool)
            .await
    }

    /// Approve an event, optionally assigning a monitor.
    ///
    /// Runs in a transaction with a row lock so the previous status read
    /// and the write are atomic. Returns the updated row and the previous
    /// status, or `None` if the event is gone. A REJECTED event is left
    /// untouched (the caller maps the returned previous status to
    /// `InvalidState`).
    pub async fn approve(
        pool: &PgPool,
        id: DbId,
        monitor_id: Option<&str>,
        monitor_name: Option<&str>,
    ) -> Result<Option<(Event, String)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let prev: Option<String> = sqlx::query_scalar(
            "SELECT moderation_status FROM events
             WHERE id = $1 AND archived_at IS NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(prev) = prev else {
            return Ok(None);
        };

        if prev == campus_core::event::STATUS_REJECTED {
            // Terminal; report the previous status without writing.
            let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
            let event = sqlx::query_as::<_, Event>(&query)
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
            tx.commit().await?;
            return Ok(Some((event, prev)));
        }

        let query = format!(
            "UPDATE events SET
                moderation_status = $2,
                monitor_id = COALESCE($3, monitor_id),
                monitor_name = COALESCE($4, monitor_name),
                updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let event = sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(STATUS_APPROVED)
            .bind(monitor_id)
            .bind(monitor_name)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((event, prev)))
    }

    /// Reject an event. Returns the updated row and the previous status.
    /// Rejecting an already-REJECTED event is a no-op write.
    pub async fn reject(pool: &PgPool, id: DbId) -> Result<Option<(Event, String)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let prev: Option<String> = sqlx::query_scalar(
            "SELECT moderation_status FROM events
             WHERE id = $1 AND archived_at IS NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(prev) = prev else {
            return Ok(None);
        };

        let query = format!(
            "UPDATE events SET moderation_status = $2, updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let event = sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(campus_core::event::STATUS_REJECTED)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((event, prev)))
    }

    /// Hard-delete an event. Registrations and the approval flow cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
