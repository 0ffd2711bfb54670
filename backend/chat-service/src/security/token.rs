use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Session token claims. `sub` is the member id (lowercased email).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub role: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

pub fn issue_token(
    secret: &str,
    member_id: &str,
    display_name: &str,
    role: Option<&str>,
    ttl_minutes: i64,
) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: member_id.to_string(),
        name: display_name.to_string(),
        role: role.map(|r| r.to_string()),
        iat: now.timestamp(),
        exp: (now + chrono::Duration::minutes(ttl_minutes)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!(error = %e, "failed to sign session token");
        AppError::Internal
    })
}

/// Validate signature and expiry; any failure is an undifferentiated 401
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-test-secret-test-secret!";

    #[test]
    fn token_round_trips_claims() {
        let token = issue_token(SECRET, "alice@example.com", "Alice", Some("admin"), 60).unwrap();
        let claims = verify_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, "alice@example.com");
        assert_eq!(claims.name, "Alice");
        assert_eq!(claims.role.as_deref(), Some("admin"));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tampered_or_foreign_tokens_are_rejected() {
        let token = issue_token(SECRET, "alice@example.com", "Alice", None, 60).unwrap();
        assert!(verify_token("another-secret-another-secret-now!", &token).is_err());
        assert!(verify_token(SECRET, "not.a.token").is_err());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let token = issue_token(SECRET, "alice@example.com", "Alice", None, -5).unwrap();
        assert!(matches!(
            verify_token(SECRET, &token),
            Err(AppError::Unauthorized)
        ));
    }
}
