//! Resolution of (college, department) scope for a principal.
//!
//! The profile service owns this data; we consult it behind the
//! [`ScopeResolver`] seam so handlers and tests never reach a network
//! directly. A small TTL cache sits in front of the HTTP implementation --
//! college and department rarely change, so bounded staleness is an
//! accepted trade, and a disabled cache is treated exactly like a
//! permanent miss.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use campus_core::error::CoreError;
use serde::Deserialize;

/// Tenant scope resolved for a principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub college_id: String,
    pub department: String,
}

/// Capability: resolve the scope for a principal id.
#[async_trait]
pub trait ScopeResolver: Send + Sync {
    async fn resolve(&self, principal_id: &str) -> Result<Scope, CoreError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Wire shape of the profile service response.
#[derive(Debug, Deserialize)]
struct ProfileResponse {
    college_id: Option<String>,
    department: Option<String>,
}

/// Resolves scope by calling the external profile service.
pub struct HttpScopeResolver {
    client: reqwest::Client,
    base_url: String,
}

impl HttpScopeResolver {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, base_url }
    }
}

#[async_trait]
impl ScopeResolver for HttpScopeResolver {
    async fn resolve(&self, principal_id: &str) -> Result<Scope, CoreError> {
        let url = format!("{}/profiles/{}", self.base_url, principal_id);

        let response = self.client.get(&url).send().await.map_err(|e| {
            CoreError::UpstreamUnavailable(format!("Profile service unreachable: {e}"))
        })?;

        if !response.status().is_success() {
            return Err(CoreError::UpstreamUnavailable(format!(
                "Profile service returned HTTP {}",
                response.status()
            )));
        }

        let profile: ProfileResponse = response.json().await.map_err(|e| {
            CoreError::UpstreamUnavailable(format!("Malformed profile response: {e}"))
        })?;

        match (profile.college_id, profile.department) {
            (Some(college_id), Some(department))
                if !college_id.is_empty() && !department.is_empty() =>
            {
                Ok(Scope {
                    college_id,
                    department,
                })
            }
            _ => Err(CoreError::Validation(
                "Profile is incomplete: college or department missing".into(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// TTL cache
// ---------------------------------------------------------------------------

/// Explicitly constructed scope cache with a defined TTL and a disabled
/// mode all callers treat identically (every lookup misses).
pub struct ScopeCache {
    ttl: Duration,
    disabled: bool,
    entries: Mutex<HashMap<String, (Scope, Instant)>>,
}

impl ScopeCache {
    pub fn new(ttl: Duration, disabled: bool) -> Self {
        Self {
            ttl,
            disabled,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn get(&self, principal_id: &str) -> Option<Scope> {
        if self.disabled {
            return None;
        }
        let entries = self.entries.lock().expect("scope cache poisoned");
        let (scope, inserted) = entries.get(principal_id)?;
        if inserted.elapsed() > self.ttl {
            return None;
        }
        Some(scope.clone())
    }

    fn put(&self, principal_id: &str, scope: Scope) {
        if self.disabled {
            return;
        }
        let mut entries = self.entries.lock().expect("scope cache poisoned");
        entries.insert(principal_id.to_string(), (scope, Instant::now()));
    }
}

/// [`ScopeResolver`] decorator that consults the cache before the inner
/// resolver. Only successful resolutions are cached.
pub struct CachedScopeResolver<R> {
    inner: R,
    cache: ScopeCache,
}

impl<R: ScopeResolver> CachedScopeResolver<R> {
    pub fn new(inner: R, cache: ScopeCache) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl<R: ScopeResolver> ScopeResolver for CachedScopeResolver<R> {
    async fn resolve(&self, principal_id: &str) -> Result<Scope, CoreError> {
        if let Some(scope) = self.cache.get(principal_id) {
            return Ok(scope);
        }
        let scope = self.inner.resolve(principal_id).await?;
        self.cache.put(principal_id, scope.clone());
        Ok(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingResolver {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ScopeResolver for CountingResolver {
        async fn resolve(&self, _principal_id: &str) -> Result<Scope, CoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Scope {
                college_id: "college-1".into(),
                department: "CS".into(),
            })
        }
    }

    #[tokio::test]
    async fn test_cache_hit_skips_inner_resolver() {
        let resolver = CachedScopeResolver::new(
            CountingResolver {
                calls: AtomicUsize::new(0),
            },
            ScopeCache::new(Duration::from_secs(300), false),
        );

        resolver.resolve("u-1").await.unwrap();
        resolver.resolve("u-1").await.unwrap();

        assert_eq!(resolver.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disabled_cache_always_misses() {
        let resolver = CachedScopeResolver::new(
            CountingResolver {
                calls: AtomicUsize::new(0),
            },
            ScopeCache::new(Duration::from_secs(300), true),
        );

        resolver.resolve("u-1").await.unwrap();
        resolver.resolve("u-1").await.unwrap();

        assert_eq!(resolver.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_distinct_principals_cached_separately() {
        let resolver = CachedScopeResolver::new(
            CountingResolver {
                calls: AtomicUsize::new(0),
            },
            ScopeCache::new(Duration::from_secs(300), false),
        );

        resolver.resolve("u-1").await.unwrap();
        resolver.resolve("u-2").await.unwrap();

        assert_eq!(resolver.inner.calls.load(Ordering::SeqCst), 2);
    }
}
