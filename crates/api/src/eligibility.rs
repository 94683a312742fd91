//! Creation eligibility for student principals.
//!
//! Students need a set of qualifying badges before they may create events;
//! the badge service owns the data. The check FAILS CLOSED: when the
//! upstream cannot answer, the student is denied with a diagnostic reason
//! rather than silently allowed.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Outcome of an eligibility check.
#[derive(Debug, Clone, Serialize)]
pub struct Eligibility {
    pub can_create: bool,
    /// Badge names still missing, or a diagnostic reason when the upstream
    /// was unavailable.
    pub missing: Vec<String>,
}

impl Eligibility {
    pub fn allowed() -> Self {
        Self {
            can_create: true,
            missing: Vec::new(),
        }
    }
}

/// Capability: check creation eligibility for a principal id.
#[async_trait]
pub trait EligibilityChecker: Send + Sync {
    async fn check(&self, principal_id: &str) -> Eligibility;
}

/// Wire shape of the badge service response.
#[derive(Debug, Deserialize)]
struct BadgeResponse {
    badges: Vec<String>,
}

/// Checks eligibility against the external badge service.
pub struct HttpEligibilityChecker {
    client: reqwest::Client,
    base_url: String,
    required_badges: Vec<String>,
}

impl HttpEligibilityChecker {
    pub fn new(base_url: String, required_badges: Vec<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            base_url,
            required_badges,
        }
    }

    async fn fetch_badges(&self, principal_id: &str) -> Result<Vec<String>, String> {
        let url = format!("{}/users/{}/badges", self.base_url, principal_id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("Badge service unreachable: {e}"))?;

        if !response.status().is_success() {
            return Err(format!(
                "Badge service returned HTTP {}",
                response.status()
            ));
        }

        let body: BadgeResponse = response
            .json()
            .await
            .map_err(|e| format!("Malformed badge response: {e}"))?;
        Ok(body.badges)
    }
}

#[async_trait]
impl EligibilityChecker for HttpEligibilityChecker {
    async fn check(&self, principal_id: &str) -> Eligibility {
        match self.fetch_badges(principal_id).await {
            Ok(held) => {
                let missing = missing_badges(&self.required_badges, &held);
                Eligibility {
                    can_create: missing.is_empty(),
                    missing,
                }
            }
            Err(reason) => {
                tracing::warn!(
                    principal_id,
                    error = %reason,
                    "Eligibility check failed, denying creation"
                );
                Eligibility {
                    can_create: false,
                    missing: vec![reason],
                }
            }
        }
    }
}

/// Required badges the principal does not hold, in required order.
fn missing_badges(required: &[String], held: &[String]) -> Vec<String> {
    required
        .iter()
        .filter(|badge| !held.contains(badge))
        .cloned()
        .collect()
}
