//! Periodic escalation of stalled approval flows.
//!
//! A flow left pending past its college's escalation delay is handed to a
//! backup approver (or the head admin). The sweep is safe to run from
//! multiple instances: the reassignment UPDATE is guarded in SQL, so only
//! the instance whose write lands emits the notification.

use std::sync::Arc;
use std::time::Duration;

use campus_core::escalation::{resolve_escalation_target, DEFAULT_ESCALATION_DELAY_HOURS};
use campus_db::repositories::{ApprovalFlowRepo, EscalationPolicyRepo};
use campus_db::DbPool;
use campus_notify::bus::EVENT_ESCALATED;
use campus_notify::{LifecycleEvent, NotifyBus};
use serde_json::json;
use tokio_util::sync::CancellationToken;

/// Run the escalation sweep loop until `cancel` is triggered.
pub async fn run(
    pool: DbPool,
    notify: Arc<NotifyBus>,
    interval_secs: u64,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs, "Escalation sweep started");

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Escalation sweep stopping");
                break;
            }
            _ = interval.tick() => {
                match sweep_once(&pool, &notify).await {
                    Ok(escalated) => {
                        if escalated > 0 {
                            tracing::info!(escalated, "Escalation sweep: flows reassigned");
                        } else {
                            tracing::debug!("Escalation sweep: nothing due");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Escalation sweep failed");
                    }
                }
            }
        }
    }
}

/// One sweep pass. Returns how many flows were escalated.
///
/// A flow with no resolvable target (no backups, head fallback disabled)
/// is left pending and will be reconsidered on the next pass.
pub async fn sweep_once(pool: &DbPool, notify: &NotifyBus) -> Result<u32, sqlx::Error> {
    let due = ApprovalFlowRepo::list_due_for_escalation(pool, DEFAULT_ESCALATION_DELAY_HOURS)
        .await?;
    let mut escalated = 0u32;

    for flow in due {
        let policy = EscalationPolicyRepo::find_by_college(pool, &flow.college_id).await?;

        let target = match policy {
            Some(ref p) => resolve_escalation_target(
                &p.backup_approver_ids,
                &p.backup_approver_names,
                p.auto_escalate_to_head,
                p.head_admin_id.as_deref(),
                p.head_admin_name.as_deref(),
            ),
            None => None,
        };

        let Some(target) = target else {
            tracing::debug!(
                flow_id = flow.flow_id,
                college_id = %flow.college_id,
                "No escalation target configured, leaving flow pending"
            );
            continue;
        };

        // The guard loses races against concurrent sweeps and late
        // moderation; a lost race must not notify.
        let changed =
            ApprovalFlowRepo::mark_escalated(pool, flow.flow_id, &target.id, &target.name)
                .await?;
        if !changed {
            continue;
        }

        escalated += 1;
        tracing::info!(
            flow_id = flow.flow_id,
            event_id = flow.event_id,
            escalated_to = %target.id,
            "Approval flow escalated"
        );
        notify.publish(
            LifecycleEvent::new(EVENT_ESCALATED, flow.event_id, &flow.college_id).with_payload(
                json!({
                    "title": flow.event_title,
                    "escalated_to": target.id,
                    "escalated_to_name": target.name,
                    "submitted_at": flow.submitted_at,
                }),
            ),
        );
    }

    Ok(escalated)
}
