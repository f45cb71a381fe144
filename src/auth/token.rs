/**
 * Token Service
 * Stateless HS256 JWTs binding a user id and role. Expiry is the only
 * invalidation path.
 */
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Identity, Role};
use crate::config::TokenConfig;
use crate::db::models::User;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Malformed, wrongly signed and expired tokens are deliberately the same.
    #[error("invalid token")]
    InvalidToken,

    #[error("failed to sign token: {0}")]
    Issue(#[from] jsonwebtoken::errors::Error),
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            ttl: config.ttl,
        }
    }

    /// Issue a token for `user`, valid for the configured lifetime.
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            role: user.role,
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Check signature and expiry and return the bound identity.
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!("Token verification failed: {}", e);
            TokenError::InvalidToken
        })?;

        Ok(Identity {
            user_id: data.claims.sub,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
        }
    }

    fn service(secret: &str, ttl: Duration) -> TokenService {
        TokenService::new(&TokenConfig::new(secret, ttl))
    }

    #[test]
    fn test_issue_then_verify_returns_identity() {
        let tokens = service("secret", Duration::hours(1));
        let alice = user(Role::Admin);
        let token = tokens.issue(&alice).unwrap();

        let identity = tokens.verify(&token).unwrap();
        assert_eq!(identity.user_id, alice.id);
        assert_eq!(identity.role, Role::Admin);
    }

    #[test]
    fn test_token_signed_with_other_key_is_invalid() {
        let token = service("one", Duration::hours(1))
            .issue(&user(Role::Standard))
            .unwrap();
        let result = service("two", Duration::hours(1)).verify(&token);
        assert!(matches!(result, Err(TokenError::InvalidToken)));
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let tokens = service("secret", Duration::seconds(-30));
        let token = tokens.issue(&user(Role::Standard)).unwrap();
        assert!(matches!(tokens.verify(&token), Err(TokenError::InvalidToken)));
    }

    #[test]
    fn test_corrupted_token_is_invalid() {
        let tokens = service("secret", Duration::hours(1));
        let mut token = tokens.issue(&user(Role::Standard)).unwrap();
        token.push('x');

        assert!(matches!(tokens.verify(&token), Err(TokenError::InvalidToken)));
        assert!(matches!(
            tokens.verify("invalid.jwt.token"),
            Err(TokenError::InvalidToken)
        ));
        assert!(matches!(tokens.verify(""), Err(TokenError::InvalidToken)));
    }
}
