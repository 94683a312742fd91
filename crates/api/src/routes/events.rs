use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::{events, export, moderation, registration};
use crate::state::AppState;

/// Mount `/events` routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/events",
            get(events::list_events).post(events::create_event),
        )
        .route("/events/mine", get(events::list_my_events))
        .route("/events/eligibility", get(events::check_eligibility))
        .route(
            "/events/{id}",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route(
            "/events/{id}/register",
            post(registration::register).delete(registration::unregister),
        )
        .route("/events/{id}/moderate", patch(moderation::moderate_event))
        .route("/events/{id}/export", get(export::export_registrations))
}
