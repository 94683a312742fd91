//! Validation of access tokens issued by the external identity service.
//!
//! Tokens are HS256-signed JWTs with issuer and audience claims checked
//! against configuration. This service only verifies; it never issues.

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// JWT claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the principal's opaque id at the identity provider.
    pub sub: String,
    /// Display name, denormalized into authored records.
    pub name: String,
    /// Role names held by the principal (e.g. `["STUDENT"]`).
    pub roles: Vec<String>,
    pub iss: String,
    pub aud: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
}

/// Configuration for JWT token validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret shared with the identity service.
    pub secret: String,
    /// Expected `iss` claim.
    pub issuer: String,
    /// Expected `aud` claim.
    pub audience: String,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var        | Required |
    /// |----------------|----------|
    /// | `JWT_SECRET`   | **yes**  |
    /// | `JWT_ISSUER`   | **yes**  |
    /// | `JWT_AUDIENCE` | **yes**  |
    ///
    /// # Panics
    ///
    /// Panics if any variable is missing or `JWT_SECRET` is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let issuer =
            std::env::var("JWT_ISSUER").expect("JWT_ISSUER must be set in the environment");
        let audience =
            std::env::var("JWT_AUDIENCE").expect("JWT_AUDIENCE must be set in the environment");

        Self {
            secret,
            issuer,
            audience,
        }
    }
}

/// Validate an access token, checking signature, expiry, issuer, and
/// audience. Returns the decoded claims.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default(); // HS256
    validation.set_issuer(&[&config.issuer]);
    validation.set_audience(&[&config.audience]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}
