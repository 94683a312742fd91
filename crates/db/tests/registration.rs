//! Integration tests for the capacity-safe registration protocol.

use campus_core::event::STATUS_APPROVED;
use campus_db::models::event::NewEvent;
use campus_db::models::registration::RegistrationOutcome;
use campus_db::repositories::{EventRepo, RegistrationRepo};

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use sqlx::PgPool;

fn approved_event(title: &str, capacity: Option<i32>) -> NewEvent {
    let start = Utc::now() + Duration::days(7);
    NewEvent {
        college_id: "c1".to_string(),
        author_id: "faculty-1".to_string(),
        author_name: "Prof. Author".to_string(),
        author_role: "FACULTY".to_string(),
        title: title.to_string(),
        description: "An event".to_string(),
        start_at: start,
        end_at: start + Duration::hours(2),
        event_type: "SEMINAR".to_string(),
        mode: "ONSITE".to_string(),
        location: Some("Hall B".to_string()),
        meeting_url: None,
        capacity,
        visible_to_all_depts: true,
        departments: vec![],
        tags: vec![],
        moderation_status: STATUS_APPROVED.to_string(),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn register_and_unregister(pool: PgPool) {
    let event = EventRepo::create(&pool, &approved_event("E", None)).await.unwrap();

    let outcome = RegistrationRepo::register(&pool, event.id, "u-1", "User One")
        .await
        .unwrap();
    match outcome {
        RegistrationOutcome::Registered {
            registration,
            now_full,
        } => {
            assert_eq!(registration.event_id, event.id);
            assert_eq!(registration.user_id, "u-1");
            // Unlimited capacity never fills.
            assert!(!now_full);
        }
        other => panic!("expected Registered, got {other:?}"),
    }

    assert!(RegistrationRepo::exists(&pool, event.id, "u-1").await.unwrap());
    assert_eq!(RegistrationRepo::unregister(&pool, event.id, "u-1").await.unwrap(), 1);
    assert!(!RegistrationRepo::exists(&pool, event.id, "u-1").await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_registration_is_reported_not_inserted(pool: PgPool) {
    let event = EventRepo::create(&pool, &approved_event("E", Some(10))).await.unwrap();

    RegistrationRepo::register(&pool, event.id, "u-1", "User One")
        .await
        .unwrap();
    let second = RegistrationRepo::register(&pool, event.id, "u-1", "User One")
        .await
        .unwrap();

    assert_matches!(second, RegistrationOutcome::AlreadyRegistered);
    assert_eq!(RegistrationRepo::count_for_event(&pool, event.id).await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn full_event_turns_registrations_away(pool: PgPool) {
    let event = EventRepo::create(&pool, &approved_event("E", Some(1))).await.unwrap();

    let first = RegistrationRepo::register(&pool, event.id, "u-1", "User One")
        .await
        .unwrap();
    match first {
        RegistrationOutcome::Registered { now_full, .. } => assert!(now_full),
        other => panic!("expected Registered, got {other:?}"),
    }

    let second = RegistrationRepo::register(&pool, event.id, "u-2", "User Two")
        .await
        .unwrap();
    assert_matches!(second, RegistrationOutcome::Full);
    assert_eq!(RegistrationRepo::count_for_event(&pool, event.id).await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn now_full_fires_exactly_on_the_last_slot(pool: PgPool) {
    let event = EventRepo::create(&pool, &approved_event("E", Some(3))).await.unwrap();

    for (user, expect_full) in [("u-1", false), ("u-2", false), ("u-3", true)] {
        let outcome = RegistrationRepo::register(&pool, event.id, user, user)
            .await
            .unwrap();
        match outcome {
            RegistrationOutcome::Registered { now_full, .. } => {
                assert_eq!(now_full, expect_full, "user {user}");
            }
            other => panic!("expected Registered for {user}, got {other:?}"),
        }
    }
}

/// Capacity under contention: more concurrent registrants than slots,
/// exactly `capacity` succeed. The serializable retry loop inside
/// `register` absorbs the conflicts.
#[sqlx::test(migrations = "./migrations")]
async fn concurrent_registrations_never_oversell(pool: PgPool) {
    const CAPACITY: i32 = 5;
    const CONTENDERS: usize = 12;

    let event = EventRepo::create(&pool, &approved_event("E", Some(CAPACITY)))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..CONTENDERS {
        let pool = pool.clone();
        let event_id = event.id;
        handles.push(tokio::spawn(async move {
            let user = format!("u-{i}");
            // The repo retries serialization conflicts a bounded number
            // of times; under this much deliberate contention the budget
            // can run out, so keep calling until a terminal outcome.
            loop {
                match RegistrationRepo::register(&pool, event_id, &user, &user).await {
                    Ok(outcome) => return outcome,
                    Err(e) => {
                        let code = e.as_database_error().and_then(|d| d.code().map(String::from));
                        assert_eq!(code.as_deref(), Some("40001"), "unexpected error: {e}");
                    }
                }
            }
        }));
    }

    let mut registered = 0;
    let mut full = 0;
    for handle in handles {
        match handle.await.unwrap() {
            RegistrationOutcome::Registered { .. } => registered += 1,
            RegistrationOutcome::Full => full += 1,
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    assert_eq!(registered, CAPACITY);
    assert_eq!(registered + full, CONTENDERS as i32);
    assert_eq!(
        RegistrationRepo::count_for_event(&pool, event.id).await.unwrap(),
        CAPACITY as i64
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn unregister_is_idempotent(pool: PgPool) {
    let event = EventRepo::create(&pool, &approved_event("E", None)).await.unwrap();

    assert_eq!(RegistrationRepo::unregister(&pool, event.id, "ghost").await.unwrap(), 0);

    RegistrationRepo::register(&pool, event.id, "u-1", "User One")
        .await
        .unwrap();
    assert_eq!(RegistrationRepo::unregister(&pool, event.id, "u-1").await.unwrap(), 1);
    assert_eq!(RegistrationRepo::unregister(&pool, event.id, "u-1").await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn slot_freed_by_unregister_is_reusable(pool: PgPool) {
    let event = EventRepo::create(&pool, &approved_event("E", Some(1))).await.unwrap();

    RegistrationRepo::register(&pool, event.id, "u-1", "User One")
        .await
        .unwrap();
    RegistrationRepo::unregister(&pool, event.id, "u-1").await.unwrap();

    let outcome = RegistrationRepo::register(&pool, event.id, "u-2", "User Two")
        .await
        .unwrap();
    assert_matches!(outcome, RegistrationOutcome::Registered { .. });
}
