//! HS256 access tokens

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tubely_core::constants::TOKEN_ISSUER;
use tubely_processing::{IdentityError, IdentityProvider};
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub iss: String,
    pub sub: Uuid, // user_id
    pub iat: i64,
    pub exp: i64,
}

/// Validates (and, for tooling and tests, issues) access tokens signed with
/// the shared secret.
#[derive(Clone)]
pub struct JwtIdentityProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityProvider {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign a token for `user_id` valid for `ttl`.
    pub fn issue(&self, user_id: Uuid, ttl: Duration) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = AccessClaims {
            iss: TOKEN_ISSUER.to_string(),
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    pub fn validate(&self, token: &str) -> Result<AccessClaims, IdentityError> {
        decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| IdentityError::InvalidCredential(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn exchange(&self, bearer_token: &str) -> Result<Uuid, IdentityError> {
        let claims = self.validate(bearer_token)?;
        Ok(claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "a-test-secret-that-is-at-least-32-chars";

    #[tokio::test]
    async fn test_issue_and_exchange() {
        let provider = JwtIdentityProvider::new(SECRET);
        let user_id = Uuid::new_v4();
        let token = provider.issue(user_id, Duration::hours(1)).unwrap();

        assert_eq!(provider.exchange(&token).await.unwrap(), user_id);
    }

    #[tokio::test]
    async fn test_rejects_foreign_or_expired_tokens() {
        let provider = JwtIdentityProvider::new(SECRET);
        let other = JwtIdentityProvider::new("another-secret-that-is-at-least-32-chars");
        let user_id = Uuid::new_v4();

        let forged = other.issue(user_id, Duration::hours(1)).unwrap();
        assert!(provider.exchange(&forged).await.is_err());

        let expired = provider.issue(user_id, Duration::hours(-2)).unwrap();
        assert!(provider.exchange(&expired).await.is_err());

        assert!(provider.exchange("not-a-jwt").await.is_err());
    }

    #[test]
    fn test_rejects_wrong_issuer() {
        let provider = JwtIdentityProvider::new(SECRET);
        let claims = AccessClaims {
            iss: "someone-else".to_string(),
            sub: Uuid::new_v4(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(provider.validate(&token).is_err());
    }
}
