//! Registration join record and the registration protocol outcome.

use campus_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Row from `event_registrations`. The (event_id, user_id) pair is unique.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Registration {
    pub id: DbId,
    pub event_id: DbId,
    pub user_id: String,
    pub user_name: String,
    pub joined_at: Timestamp,
}

/// Result of the capacity-safe registration protocol.
#[derive(Debug)]
pub enum RegistrationOutcome {
    /// A new registration row was committed. `now_full` is set when this
    /// registration took the last remaining slot.
    Registered {
        registration: Registration,
        now_full: bool,
    },
    /// The event was at capacity; nothing was written.
    Full,
    /// The (event, user) pair already exists; nothing was written.
    AlreadyRegistered,
}
