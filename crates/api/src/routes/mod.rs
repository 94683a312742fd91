pub mod admin;
pub mod events;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /events                      list (GET), create (POST)
/// /events/mine                 caller's own events
/// /events/eligibility          creation eligibility probe
/// /events/{id}                 get, update (PUT, partial), delete
/// /events/{id}/register        register (POST), unregister (DELETE)
/// /events/{id}/moderate        moderator actions (PATCH)
/// /events/{id}/export          registration roster CSV (privileged)
///
/// /admin/audit-logs            moderation trail (moderators)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(events::router())
        .merge(admin::router())
}
