//! Account session tokens.
//!
//! Access tokens are short-lived HS256 JWTs carrying [`Claims`]. Refresh
//! tokens are random opaque strings handed to the client once; the sessions
//! table only ever sees their SHA-256 hex digest.

use companion_core::types::DbId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Payload of an access token, read back by the `AuthUser` extractor.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Id of the signed-in account.
    pub sub: DbId,
    /// The account role at signing time, `ROLE_ADMIN` or `ROLE_USER`.
    pub role: String,
    /// Unix seconds after which the token is refused.
    pub exp: i64,
    /// Unix seconds at signing time.
    pub iat: i64,
    /// Random UUID v4, so two tokens minted in the same second still differ.
    pub jti: String,
}

/// Signing secret and token lifetimes, held in `ServerConfig::jwt`.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC key for signing and verifying access tokens.
    pub secret: String,
    /// How long an access token stays valid, in minutes.
    pub access_token_expiry_mins: i64,
    /// How long a refresh session stays valid, in days.
    pub refresh_token_expiry_days: i64,
}

/// Access token lifetime when `JWT_ACCESS_EXPIRY_MINS` is unset.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;
/// Refresh session lifetime when `JWT_REFRESH_EXPIRY_DAYS` is unset.
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 30;

impl JwtConfig {
    /// Read the token settings at startup.
    ///
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `JWT_SECRET`               | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | no       | `15`    |
    /// | `JWT_REFRESH_EXPIRY_DAYS`  | no       | `30`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins: i64 = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_MINS.to_string())
            .parse()
            .expect("JWT_ACCESS_EXPIRY_MINS must be a valid i64");

        let refresh_token_expiry_days: i64 = std::env::var("JWT_REFRESH_EXPIRY_DAYS")
            .unwrap_or_else(|_| DEFAULT_REFRESH_EXPIRY_DAYS.to_string())
            .parse()
            .expect("JWT_REFRESH_EXPIRY_DAYS must be a valid i64");

        Self {
            secret,
            access_token_expiry_mins,
            refresh_token_expiry_days,
        }
    }
}

/// Sign a fresh access token for `account_id` with the given role,
/// expiring `access_token_expiry_mins` from now.
pub fn generate_access_token(
    account_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: account_id,
        role: role.to_string(),
        exp: now + config.access_token_expiry_mins * 60,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify the signature and expiry of an access token and return its claims.
///
/// Fails on a bad signature, a malformed token, or an `exp` in the past
/// (beyond jsonwebtoken's default leeway).
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Mint a refresh token.
///
/// Returns `(plaintext, sha256_hex)`. The plaintext goes to the client; the
/// hash is what the session row stores.
pub fn generate_refresh_token() -> (String, String) {
    let plaintext = Uuid::new_v4().to_string();
    let hash = hash_refresh_token(&plaintext);
    (plaintext, hash)
}

/// Lowercase hex SHA-256 of a refresh token, used to look up its session.
pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
