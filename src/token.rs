/// Bearer token issuance and verification
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

/// Login tokens are short-lived; expiry forces re-authentication since
/// there is no refresh mechanism.
pub const LOGIN_TOKEN_MINUTES: i64 = 10;

/// Signed bearer token handed to a caller on successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs claim sets into HMAC-SHA-256 JWTs.
///
/// The signing secret is validated at startup; an empty key can never
/// reach this type.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Sign a claim set with not-before = now and the supplied expiry.
    pub fn issue(&self, claims: &[(&str, Value)], expires_at: DateTime<Utc>) -> AppResult<String> {
        let now = Utc::now();
        let mut payload = Map::new();
        for (name, value) in claims {
            payload.insert((*name).to_string(), value.clone());
        }
        payload.insert("nbf".to_string(), Value::from(now.timestamp()));
        payload.insert("exp".to_string(), Value::from(expires_at.timestamp()));

        encode(&Header::default(), &payload, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
    }

    /// Issue the login bearer token carrying the user's email claim.
    pub fn issue_login(&self, email: &str) -> AppResult<AuthToken> {
        let expires_at = Utc::now() + Duration::minutes(LOGIN_TOKEN_MINUTES);
        let token = self.issue(
            &[
                ("sub", Value::from(email)),
                ("email", Value::from(email)),
            ],
            expires_at,
        )?;
        Ok(AuthToken { token, expires_at })
    }

    /// Verify signature, expiry and not-before; returns the claim map.
    pub fn verify(&self, token: &str) -> AppResult<Map<String, Value>> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_nbf = true;
        // Allow some clock skew (5 minutes)
        validation.leeway = 300;

        let data = decode::<Value>(token, &self.decoding, &validation).map_err(|e| {
            tracing::warn!("token verification failed: {}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::TokenInvalid("Token has expired.".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::TokenInvalid("Invalid token signature.".to_string())
                }
                _ => AppError::TokenInvalid(format!("Invalid token: {}", e)),
            }
        })?;

        match data.claims {
            Value::Object(map) => Ok(map),
            _ => Err(AppError::TokenInvalid("Malformed claim set.".to_string())),
        }
    }
}
