//! Bearer tokens for signed-in profiles.
//!
//! An access token is an HS256 JWT naming the profile (`sub`) and the role it
//! had at sign-in. The role claim is a hint for clients only: admin routes
//! re-read the profile on every request.

use backdrop_core::types::{DbId, Timestamp};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default token lifetime in minutes.
pub const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 60;

/// Longest token lifetime the server accepts in configuration (one week).
pub const MAX_ACCESS_EXPIRY_MINS: i64 = 7 * 24 * 60;

/// Payload of a backdrop access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Profile id.
    pub sub: DbId,
    pub role: String,
    /// Unix seconds.
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

/// Signing secret and lifetime for access tokens.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
}

impl JwtConfig {
    /// Token lifetime as reported to clients in `expires_in`.
    pub fn expires_in_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }
}

/// Sign an access token for `profile_id`, valid from `now`.
pub fn issue_access_token(
    profile_id: DbId,
    role: &str,
    config: &JwtConfig,
    now: Timestamp,
) -> Result<String, jsonwebtoken::errors::Error> {
    let issued_at = now.timestamp();
    let claims = AccessClaims {
        sub: profile_id,
        role: role.to_string(),
        exp: issued_at + config.expires_in_secs(),
        iat: issued_at,
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check the signature and expiry of a bearer token and return its claims.
pub fn decode_access_token(
    token: &str,
    config: &JwtConfig,
) -> Result<AccessClaims, jsonwebtoken::errors::Error> {
    let data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}
