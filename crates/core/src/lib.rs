//! Pure domain logic for the campus event platform.
//!
//! No I/O lives here: this crate holds the shared error taxonomy, role
//! hierarchy, event field validation, escalation decision logic, and CSV
//! formatting used by the `campus-db` and `campus-api` crates.

pub mod error;
pub mod escalation;
pub mod event;
pub mod export;
pub mod roles;
pub mod types;
