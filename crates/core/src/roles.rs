//! Well-known role name constants and hierarchy helpers.
//!
//! Role names arrive in JWT claims from the external identity provider; a
//! principal may hold several (e.g. a faculty member who is also a
//! department admin).

pub const ROLE_STUDENT: &str = "STUDENT";
pub const ROLE_FACULTY: &str = "FACULTY";
pub const ROLE_DEPT_ADMIN: &str = "DEPT_ADMIN";
pub const ROLE_HEAD_ADMIN: &str = "HEAD_ADMIN";

/// All role names the platform recognizes.
pub const VALID_ROLES: &[&str] = &[ROLE_STUDENT, ROLE_FACULTY, ROLE_DEPT_ADMIN, ROLE_HEAD_ADMIN];

/// Whether the principal holds the given role.
pub fn has_role(roles: &[String], role: &str) -> bool {
    roles.iter().any(|r| r == role)
}

/// Privileged principals (FACULTY and above) see every moderation status
/// within their college and may edit or delete any event there.
pub fn is_privileged(roles: &[String]) -> bool {
    roles
        .iter()
        .any(|r| r == ROLE_FACULTY || r == ROLE_DEPT_ADMIN || r == ROLE_HEAD_ADMIN)
}

/// Moderation (approve/reject/assign) is restricted to department and head
/// admins.
pub fn can_moderate(roles: &[String]) -> bool {
    roles
        .iter()
        .any(|r| r == ROLE_DEPT_ADMIN || r == ROLE_HEAD_ADMIN)
}

/// The eligibility gate only applies to principals whose sole standing is
/// STUDENT; any privileged role short-circuits the check.
pub fn needs_eligibility_check(roles: &[String]) -> bool {
    has_role(roles, ROLE_STUDENT) && !is_privileged(roles)
}

/// The highest-authority role the principal holds, used for the
/// denormalized `author_role` column.
pub fn primary_role(roles: &[String]) -> &str {
    for candidate in [ROLE_HEAD_ADMIN, ROLE_DEPT_ADMIN, ROLE_FACULTY, ROLE_STUDENT] {
        if has_role(roles, candidate) {
            return candidate;
        }
    }
    ROLE_STUDENT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_student_is_not_privileged() {
        assert!(!is_privileged(&roles(&[ROLE_STUDENT])));
        assert!(!can_moderate(&roles(&[ROLE_STUDENT])));
    }

    #[test]
    fn test_faculty_is_privileged_but_cannot_moderate() {
        let r = roles(&[ROLE_FACULTY]);
        assert!(is_privileged(&r));
        assert!(!can_moderate(&r));
    }

    #[test]
    fn test_admins_can_moderate() {
        assert!(can_moderate(&roles(&[ROLE_DEPT_ADMIN])));
        assert!(can_moderate(&roles(&[ROLE_HEAD_ADMIN])));
    }

    #[test]
    fn test_student_with_admin_role_skips_eligibility() {
        assert!(needs_eligibility_check(&roles(&[ROLE_STUDENT])));
        assert!(!needs_eligibility_check(&roles(&[ROLE_STUDENT, ROLE_FACULTY])));
        assert!(!needs_eligibility_check(&roles(&[ROLE_FACULTY])));
    }

    #[test]
    fn test_primary_role_picks_highest_authority() {
        assert_eq!(primary_role(&roles(&[ROLE_STUDENT, ROLE_DEPT_ADMIN])), ROLE_DEPT_ADMIN);
        assert_eq!(primary_role(&roles(&[ROLE_FACULTY])), ROLE_FACULTY);
        assert_eq!(primary_role(&roles(&[])), ROLE_STUDENT);
    }
}
