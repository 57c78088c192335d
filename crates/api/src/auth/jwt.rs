//! JWT access tokens

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access token claims; `sub` is the account id
///
/// Tokens are issued by the dashboard's sign-in service with the shared
/// `JWT_SECRET`. This server only verifies them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

#[derive(Clone)]
pub struct JwtManager {
    decoding_key: DecodingKey,
}

impl JwtManager {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Verify signature and expiry
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding_key, &validation).map(|data| data.claims)
    }
}

/// Sign a token the way the sign-in service does
#[cfg(test)]
pub(crate) fn sign_test_token(secret: &str, account_id: Uuid, ttl_secs: i64) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = time::OffsetDateTime::now_utc().unix_timestamp();
    let claims = Claims {
        sub: account_id,
        iat: now,
        exp: now + ttl_secs,
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_token_validates() {
        let manager = JwtManager::new("test-secret");
        let account_id = Uuid::new_v4();
        let token = sign_test_token("test-secret", account_id, 3600);

        let claims = manager.validate_access_token(&token).unwrap();
        assert_eq!(claims.sub, account_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = sign_test_token("secret-a", Uuid::new_v4(), 3600);
        assert!(JwtManager::new("secret-b")
            .validate_access_token(&token)
            .is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = sign_test_token("test-secret", Uuid::new_v4(), -3600);
        assert!(JwtManager::new("test-secret")
            .validate_access_token(&token)
            .is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let manager = JwtManager::new("test-secret");
        assert!(manager.validate_access_token("not.a.jwt").is_err());
    }
}
