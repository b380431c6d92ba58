//! HS256 JSON Web Tokens signed with a single shared secret.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::models::User;

type HmacSha256 = Hmac<Sha256>;

/// How long an issued token stays valid
pub const TOKEN_TTL_HOURS: i64 = 24;

const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Token signature mismatch")]
    BadSignature,

    #[error("Token expired")]
    Expired,

    #[error("Invalid signing key")]
    InvalidKey,

    #[error("Failed to encode claims: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Identity embedded in a token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub email: String,
    pub role: String,
    /// Issued at, seconds since epoch
    pub iat: i64,
    /// Expiry, seconds since epoch
    pub exp: i64,
}

pub struct TokenSigner {
    secret: Vec<u8>,
}

impl TokenSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Issue a token for `user`, valid for [`TOKEN_TTL_HOURS`] from now
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        self.issue_at(user, Utc::now())
    }

    /// Issue a token as if it had been issued at `issued_at`
    pub fn issue_at(&self, user: &User, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            id: user.id.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };

        let payload = serde_json::to_vec(&claims)?;
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(HEADER),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let signature = self.sign(signing_input.as_bytes())?;

        Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
    }

    /// Check signature and expiry, returning the embedded claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac()?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    fn sign(&self, input: &[u8]) -> Result<Vec<u8>, TokenError> {
        let mut mac = self.mac()?;
        mac.update(input);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| TokenError::InvalidKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> User {
        User {
            id: "1".to_string(),
            email: "admin@demo.com".to_string(),
            password: String::new(),
            role: "admin".to_string(),
            name: "Admin User".to_string(),
        }
    }

    #[test]
    fn issued_token_verifies_with_claims() {
        let signer = TokenSigner::new("secret");
        let token = signer.issue(&admin()).unwrap();

        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.id, "1");
        assert_eq!(claims.email, "admin@demo.com");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_HOURS * 3600);
    }

    #[test]
    fn token_expires_after_a_day() {
        let signer = TokenSigner::new("secret");
        let issued = Utc::now() - Duration::hours(TOKEN_TTL_HOURS) - Duration::minutes(1);
        let token = signer.issue_at(&admin(), issued).unwrap();

        assert!(matches!(signer.verify(&token), Err(TokenError::Expired)));

        let still_fresh = issued + Duration::hours(23);
        assert!(signer.verify_at(&token, still_fresh).is_ok());
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let token = TokenSigner::new("one").issue(&admin()).unwrap();
        let result = TokenSigner::new("two").verify(&token);
        assert!(matches!(result, Err(TokenError::BadSignature)));
    }

    #[test]
    fn tampered_claims_are_rejected() {
        let signer = TokenSigner::new("secret");
        let token = signer.issue(&admin()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let forged = URL_SAFE_NO_PAD.encode(
            r#"{"id":"1","email":"admin@demo.com","role":"owner","iat":0,"exp":9999999999}"#,
        );
        let tampered = format!("{}.{}.{}", parts[0], forged, parts[2]);

        assert!(matches!(signer.verify(&tampered), Err(TokenError::BadSignature)));
    }

    #[test]
    fn garbage_is_malformed() {
        let signer = TokenSigner::new("secret");
        assert!(matches!(signer.verify("abc"), Err(TokenError::Malformed)));
        assert!(matches!(signer.verify("a.b.c.d"), Err(TokenError::Malformed)));
        assert!(matches!(signer.verify("a.b.!!!"), Err(TokenError::Malformed)));
    }
}
