use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Signed payload of an auth token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 tokens with a fixed lifetime
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, lifetime: Duration) -> Self {
        TokenSigner {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime,
        }
    }

    pub fn issue(&self, user_id: &str) -> Result<String, AppError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<String, AppError> {
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("failed to sign token: {e}")))
    }

    /// Check signature and expiry; any failure is `Unauthorized`
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::Unauthorized("token expired".to_string()),
                ErrorKind::InvalidSignature => {
                    AppError::Unauthorized("invalid token signature".to_string())
                }
                _ => AppError::Unauthorized(format!("malformed token: {e}")),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let signer = TokenSigner::new("secret", Duration::hours(1));
        let token = signer.issue("user-42").unwrap();

        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-42");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expired_token_is_unauthorized() {
        let signer = TokenSigner::new("secret", Duration::hours(1));
        let issued = Utc::now() - Duration::hours(2);
        let token = signer.issue_at("user-42", issued).unwrap();

        match signer.verify(&token) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "token expired"),
            other => panic!("expected unauthorized, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_secret_is_unauthorized() {
        let token = TokenSigner::new("secret", Duration::hours(1))
            .issue("user-42")
            .unwrap();
        let other = TokenSigner::new("another-secret", Duration::hours(1));

        assert!(matches!(other.verify(&token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_garbage_is_unauthorized() {
        let signer = TokenSigner::new("secret", Duration::hours(1));
        assert!(matches!(
            signer.verify("not.a.token"),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(signer.verify(""), Err(AppError::Unauthorized(_))));
    }
}
