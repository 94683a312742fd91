//! Repository for `event_registrations` — the capacity-safe registration
//! protocol.
//!
//! `register` runs the capacity check and insert in a single SERIALIZABLE
//! transaction, retried on serialization conflicts, so two concurrent
//! registrations can never both pass the check when one slot remains. The
//! unique constraint on (event_id, user_id) is the backstop against
//! duplicate membership and is the intended signal for `AlreadyRegistered`.

use campus_core::types::DbId;
use sqlx::PgPool;

use crate::models::registration::{Registration, RegistrationOutcome};

/// Column list for `event_registrations` queries.
const COLUMNS: &str = "id, event_id, user_id, user_name, joined_at";

/// Unique constraint backing the one-registration-per-user invariant.
const UNIQUE_PAIR_CONSTRAINT: &str = "uq_event_registrations_event_user";

/// Attempts before a serialization conflict surfaces as an error.
const MAX_ATTEMPTS: u32 = 3;

pub struct RegistrationRepo;

impl RegistrationRepo {
    /// Register a user for an event, enforcing capacity and uniqueness.
    ///
    /// The caller has already verified the event is visible and APPROVED;
    /// a vanished event surfaces as `RowNotFound`.
    pub async fn register(
        pool: &PgPool,
        event_id: DbId,
        user_id: &str,
        user_name: &str,
    ) -> Result<RegistrationOutcome, sqlx::Error> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match Self::try_register(pool, event_id, user_id, user_name).await {
                Err(e) if is_serialization_failure(&e) && attempt < MAX_ATTEMPTS => {
                    tracing::debug!(
                        event_id,
                        attempt,
                        "Registration hit a serialization conflict, retrying"
                    );
                }
                other => return other,
            }
        }
    }

    /// One SERIALIZABLE attempt: capacity check, then insert.
    async fn try_register(
        pool: &PgPool,
        event_id: DbId,
        user_id: &str,
        user_name: &str,
    ) -> Result<RegistrationOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        let capacity: Option<i32> = sqlx::query_scalar(
            "SELECT capacity FROM events WHERE id = $1 AND archived_at IS NULL",
        )
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

        let mut now_full = false;
        if let Some(cap) = capacity {
            let count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM event_registrations WHERE event_id = $1",
            )
            .bind(event_id)
            .fetch_one(&mut *tx)
            .await?;
            if count >= cap as i64 {
                tx.rollback().await?;
                return Ok(RegistrationOutcome::Full);
            }
            now_full = count + 1 == cap as i64;
        }

        let query = format!(
            "INSERT INTO event_registrations (event_id, user_id, user_name)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Registration>(&query)
            .bind(event_id)
            .bind(user_id)
            .bind(user_name)
            .fetch_one(&mut *tx)
            .await;

        match inserted {
            Ok(registration) => {
                tx.commit().await?;
                Ok(RegistrationOutcome::Registered {
                    registration,
                    now_full,
                })
            }
            Err(e) if is_unique_violation(&e, UNIQUE_PAIR_CONSTRAINT) => {
                tx.rollback().await?;
                Ok(RegistrationOutcome::AlreadyRegistered)
            }
            Err(e) => Err(e),
        }
    }

    /// Delete the (event, user) pair. Idempotent: returns how many rows
    /// were removed, and removing zero is not an error.
    pub async fn unregister(
        pool: &PgPool,
        event_id: DbId,
        user_id: &str,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM event_registrations WHERE event_id = $1 AND user_id = $2")
                .bind(event_id)
                .bind(user_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// Count registrations for an event.
    pub async fn count_for_event(pool: &PgPool, event_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM event_registrations WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(pool)
            .await
    }

    /// List registrations for an event in join order (export, rosters).
    pub async fn list_for_event(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<Registration>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM event_registrations
             WHERE event_id = $1
             ORDER BY joined_at ASC, id ASC"
        );
        sqlx::query_as::<_, Registration>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    /// Whether the user holds a registration for the event.
    pub async fn exists(
        pool: &PgPool,
        event_id: DbId,
        user_id: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM event_registrations WHERE event_id = $1 AND user_id = $2
             )",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}

/// PostgreSQL serialization_failure (retryable under SERIALIZABLE).
fn is_serialization_failure(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("40001"))
}

/// PostgreSQL unique_violation on a specific constraint.
fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db)
            if db.code().as_deref() == Some("23505") && db.constraint() == Some(constraint)
    )
}
