use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development except
/// the JWT secret and the upstream service URLs.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, issuer, audience).
    pub jwt: JwtConfig,
    /// Base URL of the profile service that resolves (college, department)
    /// scope for a principal.
    pub profile_service_url: String,
    /// Base URL of the badge service consulted for student creation
    /// eligibility.
    pub badge_service_url: String,
    /// Badge names a student must hold to create events.
    pub required_badges: Vec<String>,
    /// Scope cache TTL in seconds (default: `300`).
    pub scope_cache_ttl_secs: u64,
    /// When set, the scope cache behaves as a permanent miss.
    pub scope_cache_disabled: bool,
    /// Optional URL the webhook notification sink listens on.
    pub notify_webhook_url: Option<String>,
    /// How often the escalation sweep runs, in seconds (default: `3600`).
    pub escalation_sweep_interval_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                 |
    /// |----------------------------------|-------------------------|
    /// | `HOST`                           | `0.0.0.0`               |
    /// | `PORT`                           | `3000`                  |
    /// | `CORS_ORIGINS`                   | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`           | `30`                    |
    /// | `PROFILE_SERVICE_URL`            | **required**            |
    /// | `BADGE_SERVICE_URL`              | **required**            |
    /// | `REQUIRED_BADGES`                | `` (empty list)         |
    /// | `SCOPE_CACHE_TTL_SECS`           | `300`                   |
    /// | `SCOPE_CACHE_DISABLED`           | unset                   |
    /// | `NOTIFY_WEBHOOK_URL`             | unset                   |
    /// | `ESCALATION_SWEEP_INTERVAL_SECS` | `3600`                  |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let profile_service_url = std::env::var("PROFILE_SERVICE_URL")
            .expect("PROFILE_SERVICE_URL must be set in the environment");

        let badge_service_url = std::env::var("BADGE_SERVICE_URL")
            .expect("BADGE_SERVICE_URL must be set in the environment");

        let required_badges: Vec<String> = std::env::var("REQUIRED_BADGES")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let scope_cache_ttl_secs: u64 = std::env::var("SCOPE_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("SCOPE_CACHE_TTL_SECS must be a valid u64");

        let scope_cache_disabled = std::env::var("SCOPE_CACHE_DISABLED").is_ok();

        let notify_webhook_url = std::env::var("NOTIFY_WEBHOOK_URL").ok();

        let escalation_sweep_interval_secs: u64 =
            std::env::var("ESCALATION_SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|_| "3600".into())
                .parse()
                .expect("ESCALATION_SWEEP_INTERVAL_SECS must be a valid u64");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            profile_service_url,
            badge_service_url,
            required_badges,
            scope_cache_ttl_secs,
            scope_cache_disabled,
            notify_webhook_url,
            escalation_sweep_interval_secs,
        }
    }
}
