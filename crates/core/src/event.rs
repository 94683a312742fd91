//! Event enum constants and field-level validation.
//!
//! Validation runs before anything touches the database; each function
//! returns a human-readable message that the API layer wraps in
//! `CoreError::Validation`. Cross-field rules (mode-dependent required
//! fields, visibility normalization) live here so both create and update
//! paths enforce the same invariants.

use crate::roles;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Enum constants
// ---------------------------------------------------------------------------

pub const TYPE_WORKSHOP: &str = "WORKSHOP";
pub const TYPE_SEMINAR: &str = "SEMINAR";
pub const TYPE_HACKATHON: &str = "HACKATHON";
pub const TYPE_MEETUP: &str = "MEETUP";

pub const VALID_EVENT_TYPES: &[&str] =
    &[TYPE_WORKSHOP, TYPE_SEMINAR, TYPE_HACKATHON, TYPE_MEETUP];

pub const MODE_ONLINE: &str = "ONLINE";
pub const MODE_ONSITE: &str = "ONSITE";
pub const MODE_HYBRID: &str = "HYBRID";

pub const VALID_MODES: &[&str] = &[MODE_ONLINE, MODE_ONSITE, MODE_HYBRID];

pub const STATUS_PENDING_REVIEW: &str = "PENDING_REVIEW";
pub const STATUS_APPROVED: &str = "APPROVED";
pub const STATUS_REJECTED: &str = "REJECTED";

pub const VALID_MODERATION_STATUSES: &[&str] =
    &[STATUS_PENDING_REVIEW, STATUS_APPROVED, STATUS_REJECTED];

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

pub fn validate_event_type(event_type: &str) -> Result<(), String> {
    if VALID_EVENT_TYPES.contains(&event_type) {
        Ok(())
    } else {
        Err(format!(
            "Invalid event type '{event_type}'. Must be one of: {}",
            VALID_EVENT_TYPES.join(", ")
        ))
    }
}

pub fn validate_mode(mode: &str) -> Result<(), String> {
    if VALID_MODES.contains(&mode) {
        Ok(())
    } else {
        Err(format!(
            "Invalid mode '{mode}'. Must be one of: {}",
            VALID_MODES.join(", ")
        ))
    }
}

pub fn validate_moderation_status(status: &str) -> Result<(), String> {
    if VALID_MODERATION_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "Invalid moderation status '{status}'. Must be one of: {}",
            VALID_MODERATION_STATUSES.join(", ")
        ))
    }
}

pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        Err("Title must not be empty".to_string())
    } else {
        Ok(())
    }
}

pub fn validate_description(description: &str) -> Result<(), String> {
    if description.trim().is_empty() {
        Err("Description must not be empty".to_string())
    } else {
        Ok(())
    }
}

/// Resolve the event time window. A missing end defaults to the start;
/// an end before the start is rejected.
pub fn resolve_times(
    start_at: Timestamp,
    end_at: Option<Timestamp>,
) -> Result<(Timestamp, Timestamp), String> {
    let end = end_at.unwrap_or(start_at);
    if end < start_at {
        return Err("End time must not be before start time".to_string());
    }
    Ok((start_at, end))
}

/// Mode-dependent required fields: a location unless purely online, a
/// meeting URL unless purely onsite. HYBRID requires both.
pub fn validate_mode_fields(
    mode: &str,
    location: Option<&str>,
    meeting_url: Option<&str>,
) -> Result<(), String> {
    let missing = |opt: Option<&str>| opt.map(str::trim).filter(|s| !s.is_empty()).is_none();

    if mode != MODE_ONLINE && missing(location) {
        return Err(format!("Location is required for {mode} events"));
    }
    if mode != MODE_ONSITE && missing(meeting_url) {
        return Err(format!("Meeting URL is required for {mode} events"));
    }
    Ok(())
}

pub fn validate_capacity(capacity: Option<i32>) -> Result<(), String> {
    match capacity {
        Some(c) if c <= 0 => Err("Capacity must be a positive integer".to_string()),
        _ => Ok(()),
    }
}

/// Normalize the visibility pair: visible-to-all forces an empty department
/// list (regardless of what was supplied), otherwise at least one
/// department must be named.
pub fn normalize_visibility(
    visible_to_all_depts: bool,
    departments: Vec<String>,
) -> Result<(bool, Vec<String>), String> {
    if visible_to_all_depts {
        return Ok((true, Vec::new()));
    }
    let departments: Vec<String> = departments
        .into_iter()
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .collect();
    if departments.is_empty() {
        return Err(
            "Either visible_to_all_depts must be true or at least one department must be listed"
                .to_string(),
        );
    }
    Ok((false, departments))
}

/// STUDENT-authored events enter moderation; privileged authors are
/// approved immediately and never get an approval flow.
pub fn initial_moderation_status(author_roles: &[String]) -> &'static str {
    if roles::is_privileged(author_roles) {
        STATUS_APPROVED
    } else {
        STATUS_PENDING_REVIEW
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ts(secs: i64) -> crate::types::Timestamp {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_valid_enums_accepted() {
        for t in VALID_EVENT_TYPES {
            assert!(validate_event_type(t).is_ok());
        }
        for m in VALID_MODES {
            assert!(validate_mode(m).is_ok());
        }
        assert!(validate_event_type("CONCERT").is_err());
        assert!(validate_mode("VIRTUAL").is_err());
    }

    #[test]
    fn test_empty_title_rejected() {
        assert!(validate_title("  ").is_err());
        assert!(validate_title("Rust workshop").is_ok());
    }

    #[test]
    fn test_end_defaults_to_start() {
        let (start, end) = resolve_times(ts(1000), None).unwrap();
        assert_eq!(start, end);
    }

    #[test]
    fn test_end_before_start_rejected() {
        assert!(resolve_times(ts(1000), Some(ts(500))).is_err());
        assert!(resolve_times(ts(1000), Some(ts(1000))).is_ok());
    }

    #[test]
    fn test_onsite_requires_location() {
        let err = validate_mode_fields(MODE_ONSITE, None, None).unwrap_err();
        assert!(err.contains("Location"));
        assert!(validate_mode_fields(MODE_ONSITE, Some("Hall B"), None).is_ok());
    }

    #[test]
    fn test_online_requires_meeting_url() {
        let err = validate_mode_fields(MODE_ONLINE, None, None).unwrap_err();
        assert!(err.contains("Meeting URL"));
        assert!(validate_mode_fields(MODE_ONLINE, None, Some("https://meet.example")).is_ok());
    }

    #[test]
    fn test_hybrid_requires_both() {
        assert!(validate_mode_fields(MODE_HYBRID, Some("Hall B"), None).is_err());
        assert!(validate_mode_fields(MODE_HYBRID, None, Some("https://meet.example")).is_err());
        assert!(
            validate_mode_fields(MODE_HYBRID, Some("Hall B"), Some("https://meet.example")).is_ok()
        );
    }

    #[test]
    fn test_blank_location_counts_as_missing() {
        assert!(validate_mode_fields(MODE_ONSITE, Some("   "), None).is_err());
    }

    #[test]
    fn test_capacity_must_be_positive() {
        assert!(validate_capacity(Some(0)).is_err());
        assert!(validate_capacity(Some(-3)).is_err());
        assert!(validate_capacity(Some(1)).is_ok());
        assert!(validate_capacity(None).is_ok());
    }

    #[test]
    fn test_visible_to_all_forces_empty_departments() {
        let (all, depts) =
            normalize_visibility(true, vec!["CS".into(), "EE".into()]).unwrap();
        assert!(all);
        assert!(depts.is_empty());
    }

    #[test]
    fn test_scoped_visibility_needs_departments() {
        assert!(normalize_visibility(false, vec![]).is_err());
        assert!(normalize_visibility(false, vec!["  ".into()]).is_err());
        let (_, depts) = normalize_visibility(false, vec![" CS ".into()]).unwrap();
        assert_eq!(depts, vec!["CS".to_string()]);
    }

    #[test]
    fn test_initial_status_by_author_role() {
        let student = vec![crate::roles::ROLE_STUDENT.to_string()];
        let faculty = vec![crate::roles::ROLE_FACULTY.to_string()];
        assert_eq!(initial_moderation_status(&student), STATUS_PENDING_REVIEW);
        assert_eq!(initial_moderation_status(&faculty), STATUS_APPROVED);
    }
}
