//! Signed media URL tokens
//!
//! A token is an HS256 JWT over `{ path, exp }`. It grants read access to
//! exactly one object key until `exp`.

use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use booking_chat_core::MediaPath;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaClaims {
    pub path: String,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignedUrlError {
    #[error("Signed URL has expired")]
    Expired,

    #[error("Signed URL is invalid")]
    Invalid,

    #[error("Signed URL does not match the requested object")]
    PathMismatch,

    #[error("Failed to sign URL")]
    Signing,
}

#[derive(Clone)]
pub struct MediaUrlSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl MediaUrlSigner {
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn sign(&self, path: &MediaPath, ttl_secs: u64) -> Result<String, SignedUrlError> {
        let ttl = i64::try_from(ttl_secs).map_err(|_| SignedUrlError::Signing)?;
        let claims = MediaClaims {
            path: path.as_str().to_string(),
            exp: Utc::now().timestamp().saturating_add(ttl),
        };
        encode(&Header::default(), &claims, &self.encoding_key).map_err(|_| SignedUrlError::Signing)
    }

    /// Check `token` grants access to `path` right now
    pub fn verify(&self, token: &str, path: &str) -> Result<MediaClaims, SignedUrlError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let claims = decode::<MediaClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => SignedUrlError::Expired,
                _ => SignedUrlError::Invalid,
            })?;

        if claims.path != path {
            return Err(SignedUrlError::PathMismatch);
        }
        Ok(claims)
    }
}
