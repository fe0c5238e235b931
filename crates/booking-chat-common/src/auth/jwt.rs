//! Actor tokens
//!
//! The host platform issues HS256 bearer tokens; this service verifies them
//! and turns the claims into an [`Actor`]. Minting is available for tooling
//! and tests.

use booking_chat_core::{Actor, Snowflake};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (actor ID)
    pub sub: String,
    /// Staff/admin capability
    #[serde(default)]
    pub staff: bool,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Resolve the claims into the caller identity
    ///
    /// # Errors
    /// Returns an error if the subject is not a numeric id
    pub fn actor(&self) -> Result<Actor, AppError> {
        let id = Snowflake::parse(&self.sub).map_err(|_| AppError::InvalidToken)?;
        Ok(Actor {
            id,
            is_staff: self.staff,
        })
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// JWT service for encoding and decoding actor tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expiry: i64,
}

impl JwtService {
    #[must_use]
    pub fn new(secret: &str, access_token_expiry: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expiry,
        }
    }

    /// Mint an access token for `actor`
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn issue_access_token(&self, actor: &Actor) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: actor.id.to_string(),
            staff: actor.is_staff,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to encode JWT")))
    }

    /// Decode and validate an access token
    ///
    /// # Errors
    /// Returns an error if the token is invalid or expired
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            })
    }

    /// Validate a token and return the actor it names
    ///
    /// # Errors
    /// Returns an error if the token is invalid, expired, or names no actor
    pub fn authenticate(&self, token: &str) -> Result<Actor, AppError> {
        self.validate_access_token(token)?.actor()
    }

    #[must_use]
    pub fn access_token_expiry(&self) -> i64 {
        self.access_token_expiry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("test-secret-key-for-testing", 900)
    }

    #[test]
    fn test_issue_and_authenticate_client() {
        let jwt = service();
        let actor = Actor::client(Snowflake::new(100));
        let token = jwt.issue_access_token(&actor).unwrap();
        assert_eq!(jwt.authenticate(&token).unwrap(), actor);
    }

    #[test]
    fn test_staff_flag_survives() {
        let jwt = service();
        let token = jwt.issue_access_token(&Actor::staff(Snowflake::new(9))).unwrap();
        let claims = jwt.validate_access_token(&token).unwrap();
        assert!(claims.staff);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service()
            .issue_access_token(&Actor::client(Snowflake::new(1)))
            .unwrap();
        let other = JwtService::new("different-secret", 900);
        assert!(matches!(other.authenticate(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_expired_token() {
        // Beyond the default 60s leeway
        let jwt = JwtService::new("test-secret-key-for-testing", -120);
        let token = jwt.issue_access_token(&Actor::client(Snowflake::new(1))).unwrap();
        assert!(matches!(jwt.validate_access_token(&token), Err(AppError::TokenExpired)));
    }

    #[test]
    fn test_garbage_token() {
        assert!(matches!(service().authenticate("not.a.jwt"), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_non_numeric_subject() {
        let claims = Claims {
            sub: "alice".into(),
            staff: false,
            iat: 0,
            exp: i64::MAX,
        };
        assert!(matches!(claims.actor(), Err(AppError::InvalidToken)));
    }
}
