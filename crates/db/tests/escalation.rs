//! Integration tests for escalation due-listing and the guarded
//! escalation write.

use campus_core::escalation::DEFAULT_ESCALATION_DELAY_HOURS;
use campus_core::event::{STATUS_APPROVED, STATUS_PENDING_REVIEW};
use campus_core::types::DbId;
use campus_db::models::event::NewEvent;
use campus_db::repositories::{ApprovalFlowRepo, EscalationPolicyRepo, EventRepo};
use chrono::{Duration, Utc};
use sqlx::PgPool;

fn pending_event(college: &str, title: &str) -> NewEvent {
    let start = Utc::now() + Duration::days(14);
    NewEvent {
        college_id: college.to_string(),
        author_id: "student-1".to_string(),
        author_name: "Sam Student".to_string(),
        author_role: "STUDENT".to_string(),
        title: title.to_string(),
        description: "An event".to_string(),
        start_at: start,
        end_at: start + Duration::hours(2),
        event_type: "HACKATHON".to_string(),
        mode: "ONLINE".to_string(),
        location: None,
        meeting_url: Some("https://meet.example/x".to_string()),
        capacity: None,
        visible_to_all_depts: true,
        departments: vec![],
        tags: vec![],
        moderation_status: STATUS_PENDING_REVIEW.to_string(),
    }
}

async fn backdate_submission(pool: &PgPool, event_id: DbId, hours: i64) {
    sqlx::query(
        "UPDATE approval_flows
         SET submitted_at = now() - make_interval(hours => $2::int)
         WHERE event_id = $1",
    )
    .bind(event_id)
    .bind(hours as i32)
    .execute(pool)
    .await
    .unwrap();
}

async fn insert_policy(
    pool: &PgPool,
    college: &str,
    delay_hours: i32,
    backups: &[&str],
    auto_head: bool,
) {
    let ids: Vec<String> = backups.iter().map(|s| s.to_string()).collect();
    let names: Vec<String> = backups.iter().map(|s| format!("Name of {s}")).collect();
    sqlx::query(
        "INSERT INTO escalation_policies
            (college_id, escalation_delay_hours, backup_approver_ids,
             backup_approver_names, auto_escalate_to_head, head_admin_id, head_admin_name)
         VALUES ($1, $2, $3, $4, $5, 'head-1', 'Head Admin')",
    )
    .bind(college)
    .bind(delay_hours)
    .bind(&ids)
    .bind(&names)
    .bind(auto_head)
    .execute(pool)
    .await
    .unwrap();
}

#[sqlx::test(migrations = "./migrations")]
async fn fresh_flows_are_not_due(pool: PgPool) {
    let event = EventRepo::create(&pool, &pending_event("c1", "E")).await.unwrap();
    ApprovalFlowRepo::create(&pool, event.id, None, None).await.unwrap();

    let due = ApprovalFlowRepo::list_due_for_escalation(&pool, DEFAULT_ESCALATION_DELAY_HOURS)
        .await
        .unwrap();
    assert!(due.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn overdue_pending_flow_is_listed(pool: PgPool) {
    let event = EventRepo::create(&pool, &pending_event("c1", "Stalled")).await.unwrap();
    ApprovalFlowRepo::create(&pool, event.id, None, None).await.unwrap();
    backdate_submission(&pool, event.id, DEFAULT_ESCALATION_DELAY_HOURS + 1).await;

    let due = ApprovalFlowRepo::list_due_for_escalation(&pool, DEFAULT_ESCALATION_DELAY_HOURS)
        .await
        .unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].event_id, event.id);
    assert_eq!(due[0].event_title, "Stalled");
    assert_eq!(due[0].college_id, "c1");
}

#[sqlx::test(migrations = "./migrations")]
async fn policy_delay_overrides_the_default(pool: PgPool) {
    insert_policy(&pool, "c1", 12, &["backup-1"], false).await;

    let event = EventRepo::create(&pool, &pending_event("c1", "E")).await.unwrap();
    ApprovalFlowRepo::create(&pool, event.id, None, None).await.unwrap();
    backdate_submission(&pool, event.id, 13).await;

    // 13 hours old: past the college's 12-hour SLA even though the
    // default is much longer.
    let due = ApprovalFlowRepo::list_due_for_escalation(&pool, DEFAULT_ESCALATION_DELAY_HOURS)
        .await
        .unwrap();
    assert_eq!(due.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn resolved_flows_never_escalate(pool: PgPool) {
    let event = EventRepo::create(&pool, &pending_event("c1", "E")).await.unwrap();
    ApprovalFlowRepo::create(&pool, event.id, None, None).await.unwrap();
    backdate_submission(&pool, event.id, 200).await;

    EventRepo::approve(&pool, event.id, None, None).await.unwrap();
    ApprovalFlowRepo::mark_approved(&pool, event.id, "admin-1", "Admin", None)
        .await
        .unwrap();

    let due = ApprovalFlowRepo::list_due_for_escalation(&pool, DEFAULT_ESCALATION_DELAY_HOURS)
        .await
        .unwrap();
    assert!(due.is_empty());

    let reloaded = EventRepo::find_in_college(&pool, event.id, "c1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.moderation_status, STATUS_APPROVED);
}

#[sqlx::test(migrations = "./migrations")]
async fn escalation_fires_exactly_once(pool: PgPool) {
    let event = EventRepo::create(&pool, &pending_event("c1", "E")).await.unwrap();
    let flow = ApprovalFlowRepo::create(&pool, event.id, None, None).await.unwrap();
    backdate_submission(&pool, event.id, 100).await;

    assert!(ApprovalFlowRepo::mark_escalated(&pool, flow.id, "backup-1", "Backup One")
        .await
        .unwrap());
    // Second sweep loses the guard and must not re-notify.
    assert!(!ApprovalFlowRepo::mark_escalated(&pool, flow.id, "backup-2", "Backup Two")
        .await
        .unwrap());

    let after = ApprovalFlowRepo::find_by_event(&pool, event.id)
        .await
        .unwrap()
        .unwrap();
    assert!(after.is_escalated);
    assert_eq!(after.escalated_to.as_deref(), Some("backup-1"));
    assert_eq!(after.assigned_to.as_deref(), Some("backup-1"));

    // Escalated flows stop showing up as due.
    let due = ApprovalFlowRepo::list_due_for_escalation(&pool, DEFAULT_ESCALATION_DELAY_HOURS)
        .await
        .unwrap();
    assert!(due.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn policy_lookup_by_college(pool: PgPool) {
    insert_policy(&pool, "c1", 24, &["backup-1", "backup-2"], true).await;

    let policy = EscalationPolicyRepo::find_by_college(&pool, "c1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(policy.escalation_delay_hours, 24);
    assert_eq!(policy.backup_approver_ids.len(), 2);
    assert!(policy.auto_escalate_to_head);
    assert_eq!(policy.head_admin_id.as_deref(), Some("head-1"));

    assert!(EscalationPolicyRepo::find_by_college(&pool, "c2")
        .await
        .unwrap()
        .is_none());
}
