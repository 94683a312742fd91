//! Repository for the append-only `audit_logs` table.

use campus_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::audit::{AuditLog, AuditQuery, CreateAuditLog};

/// Column list for `audit_logs` queries.
const COLUMNS: &str = "\
    id, admin_id, admin_name, action, entity_type, entity_id, \
    before, after, reason, college_id, created_at";

pub struct AuditLogRepo;

impl AuditLogRepo {
    /// Insert a single audit entry.
    pub async fn insert(pool: &PgPool, entry: &CreateAuditLog) -> Result<AuditLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_logs
                (admin_id, admin_name, action, entity_type, entity_id,
                 before, after, reason, college_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(&entry.admin_id)
            .bind(&entry.admin_name)
            .bind(&entry.action)
            .bind(&entry.entity_type)
            .bind(entry.entity_id)
            .bind(&entry.before)
            .bind(&entry.after)
            .bind(&entry.reason)
            .bind(&entry.college_id)
            .fetch_one(pool)
            .await
    }

    /// Query audit logs for a college with filtering and pagination.
    pub async fn query(
        pool: &PgPool,
        college_id: &str,
        params: &AuditQuery,
    ) -> Result<Vec<AuditLog>, sqlx::Error> {
        let limit = params.limit.unwrap_or(50).clamp(1, 500);
        let offset = params.offset.unwrap_or(0).max(0);

        let (where_clause, bind_values, bind_idx) = build_audit_filter(params);

        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs \
             WHERE college_id = $1 {where_clause} \
             ORDER BY created_at DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let mut q = sqlx::query_as::<_, AuditLog>(&query).bind(college_id);
        for val in &bind_values {
            match val {
                BindValue::BigInt(v) => q = q.bind(*v),
                BindValue::Text(v) => q = q.bind(v.as_str()),
                BindValue::Timestamp(v) => q = q.bind(*v),
            }
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built audit log queries.
enum BindValue {
    BigInt(DbId),
    Text(String),
    Timestamp(Timestamp),
}

/// Build additional `AND ...` conditions and bind values from the filter.
/// `$1` is always the college id; returned conditions start at `$2`.
fn build_audit_filter(params: &AuditQuery) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 2u32;
    let mut bind_values: Vec<BindValue> = Vec::new();

    if let Some(ref admin_id) = params.admin_id {
        conditions.push(format!("admin_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(admin_id.clone()));
    }

    if let Some(ref action) = params.action {
        conditions.push(format!("action = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(action.clone()));
    }

    if let Some(ref entity_type) = params.entity_type {
        conditions.push(format!("entity_type = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(entity_type.clone()));
    }

    if let Some(entity_id) = params.entity_id {
        conditions.push(format!("entity_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(entity_id));
    }

    if let Some(from) = params.from {
        conditions.push(format!("created_at >= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(from));
    }

    if let Some(to) = params.to {
        conditions.push(format!("created_at <= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(to));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("AND {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}
