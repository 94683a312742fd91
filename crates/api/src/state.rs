use std::sync::Arc;

use crate::config::ServerConfig;
use crate::eligibility::EligibilityChecker;
use crate::scope::ScopeResolver;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: campus_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Scope resolver (profile service behind a TTL cache).
    pub scope: Arc<dyn ScopeResolver>,
    /// Creation eligibility checker (badge service, fail-closed).
    pub eligibility: Arc<dyn EligibilityChecker>,
    /// Lifecycle notification bus.
    pub notify: Arc<campus_notify::NotifyBus>,
}
