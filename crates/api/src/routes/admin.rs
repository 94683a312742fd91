use axum::routing::get;
use axum::Router;

use crate::handlers::audit;
use crate::state::AppState;

/// Mount `/admin` routes. Role checks live in the handlers' extractors.
pub fn router() -> Router<AppState> {
    Router::new().route("/admin/audit-logs", get(audit::list_audit_logs))
}
