use crate::config::AuthConfig;
use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub exp: i64,    // Expiration time
    pub iat: i64,    // Issued at
}

/// Mints and verifies the two token classes. Access and refresh tokens are
/// signed with independent secrets so a leak of one class cannot forge the
/// other. Expiry lives in the `exp` claim; there is no external bookkeeping.
pub struct TokenIssuer {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_expiry: Duration,
    refresh_expiry: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            access_expiry: Duration::minutes(config.access_expiry_minutes),
            refresh_expiry: Duration::days(config.refresh_expiry_days),
        }
    }

    pub fn issue_access(&self, user_id: Uuid) -> Result<String, AppError> {
        sign(user_id, self.access_expiry, &self.access_encoding)
    }

    pub fn issue_refresh(&self, user_id: Uuid) -> Result<String, AppError> {
        sign(user_id, self.refresh_expiry, &self.refresh_encoding)
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, AppError> {
        verify(token, &self.access_decoding)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, AppError> {
        verify(token, &self.refresh_decoding)
    }

    pub fn refresh_max_age_seconds(&self) -> i64 {
        self.refresh_expiry.num_seconds()
    }
}

fn sign(user_id: Uuid, expiry: Duration, key: &EncodingKey) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now + expiry).timestamp(),
        iat: now.timestamp(),
    };

    encode(&Header::default(), &claims, key).map_err(|e| AppError::Internal(e.to_string()))
}

fn verify(token: &str, key: &DecodingKey) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is exact; the default 60s leeway would let a just-expired
    // token through.
    validation.leeway = 0;

    let data = decode::<Claims>(token, key, &validation).map_err(|e| {
        tracing::debug!("token verification failed: {}", e);
        AppError::Forbidden
    })?;

    Ok(data.claims)
}

/// Parse the `sub` claim back into a user id.
pub fn subject_id(claims: &Claims) -> Result<Uuid, AppError> {
    Uuid::parse_str(&claims.sub).map_err(|_| AppError::Forbidden)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;

    fn test_config() -> AuthConfig {
        AuthConfig {
            access_secret: "test_access_secret".into(),
            refresh_secret: "test_refresh_secret".into(),
            access_expiry_minutes: 30,
            refresh_expiry_days: 30,
        }
    }

    #[test]
    fn test_issue_and_verify_access() {
        let issuer = TokenIssuer::new(&test_config());
        let user_id = Uuid::new_v4();

        let token = issuer.issue_access(user_id).unwrap();
        let claims = issuer.verify_access(&token).unwrap();

        assert_eq!(subject_id(&claims).unwrap(), user_id);
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn test_refresh_lifetime_is_thirty_days() {
        let issuer = TokenIssuer::new(&test_config());
        let token = issuer.issue_refresh(Uuid::new_v4()).unwrap();
        let claims = issuer.verify_refresh(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 60 * 60);
    }

    #[test]
    fn test_token_classes_are_not_interchangeable() {
        let issuer = TokenIssuer::new(&test_config());
        let user_id = Uuid::new_v4();

        let access = issuer.issue_access(user_id).unwrap();
        let refresh = issuer.issue_refresh(user_id).unwrap();

        assert!(issuer.verify_refresh(&access).is_err());
        assert!(issuer.verify_access(&refresh).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = TokenIssuer::new(&test_config());
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iat: (now - Duration::minutes(31)).timestamp(),
            exp: (now - Duration::minutes(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test_access_secret"),
        )
        .unwrap();

        assert!(matches!(issuer.verify_access(&token), Err(AppError::Forbidden)));
    }

    #[test]
    fn test_fresh_token_accepted() {
        let issuer = TokenIssuer::new(&test_config());
        let token = issuer.issue_access(Uuid::new_v4()).unwrap();
        assert!(issuer.verify_access(&token).is_ok());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let issuer = TokenIssuer::new(&test_config());
        let token = issuer.issue_access(Uuid::new_v4()).unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('A') { 'B' } else { 'A' });

        assert!(issuer.verify_access(&tampered).is_err());
        assert!(issuer.verify_access("not-a-jwt").is_err());
    }
}
