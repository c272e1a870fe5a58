//! Token issuer - signs and verifies the bearer tokens handed out at login.
//!
//! Tokens are HS256 JWTs carrying the account id (`sub`), username (`name`),
//! issue time and expiry. The signing secret lives in an immutable
//! [`TokenConfig`] built once at startup. There is no revocation list: a token
//! stays valid until its `exp` passes.

use crate::errors::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Lifetime of a token issued without "remember me".
pub const SESSION_TOKEN_HOURS: i64 = 24;

/// Signing configuration for [`TokenIssuer`].
#[derive(Clone)]
pub struct TokenConfig {
    secret: Arc<[u8]>,
    remember_me_days: i64,
}

impl TokenConfig {
    /// Minimum allowed secret length in bytes (256 bits)
    pub const MIN_SECRET_LENGTH: usize = 32;
    /// Longest accepted remember-me lifetime (ten years)
    pub const MAX_REMEMBER_ME_DAYS: i64 = 3650;

    /// Builds a config, rejecting short secrets and lifetimes outside
    /// `1..=MAX_REMEMBER_ME_DAYS`.
    pub fn new(secret: impl AsRef<[u8]>, remember_me_days: i64) -> Result<Self> {
        let secret = secret.as_ref();
        if secret.len() < Self::MIN_SECRET_LENGTH {
            return Err(Error::Config {
                message: format!(
                    "token secret too short: got {} bytes, need at least {}",
                    secret.len(),
                    Self::MIN_SECRET_LENGTH
                ),
            });
        }
        if !(1..=Self::MAX_REMEMBER_ME_DAYS).contains(&remember_me_days) {
            return Err(Error::Config {
                message: format!(
                    "remember-me lifetime must be between 1 and {} days, got {remember_me_days}",
                    Self::MAX_REMEMBER_ME_DAYS
                ),
            });
        }
        Ok(Self {
            secret: Arc::from(secret),
            remember_me_days,
        })
    }

    /// Lifetime of an extended ("remember me") token in days.
    #[must_use]
    pub const fn remember_me_days(&self) -> i64 {
        self.remember_me_days
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret_length", &self.secret.len())
            .field("remember_me_days", &self.remember_me_days)
            .finish()
    }
}

/// Claims embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id, as a decimal string
    pub sub: String,
    /// Username at issuance time
    pub name: String,
    /// Issued-at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
}

/// The caller's identity once a token has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Account the request acts on behalf of
    pub account_id: i32,
    /// Username embedded at issuance
    pub username: String,
}

impl Principal {
    /// Extracts the identity from verified claims.
    pub fn from_claims(claims: &Claims) -> Result<Self> {
        let account_id = claims.sub.parse().map_err(|_| Error::InvalidToken)?;
        Ok(Self {
            account_id,
            username: claims.name.clone(),
        })
    }
}

/// A freshly signed token and its lifetime.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact JWT
    pub token: String,
    /// Absolute expiry
    pub expires_at: DateTime<Utc>,
    /// Whole days of validity reported to the client
    pub expires_in_days: i64,
}

/// Signs and verifies bearer tokens with a shared symmetric secret.
#[derive(Clone)]
pub struct TokenIssuer {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    /// Builds the signing and verification keys from `config`.
    #[must_use]
    pub fn new(config: TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(&config.secret),
            decoding_key: DecodingKey::from_secret(&config.secret),
            config,
            validation,
        }
    }

    /// Lifetime of an extended token in days.
    #[must_use]
    pub const fn remember_me_days(&self) -> i64 {
        self.config.remember_me_days
    }

    /// Issues a token for `account_id`. `extended` selects the remember-me lifetime.
    pub fn issue(&self, account_id: i32, username: &str, extended: bool) -> Result<IssuedToken> {
        self.issue_at(account_id, username, extended, Utc::now())
    }

    /// Issues a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        account_id: i32,
        username: &str,
        extended: bool,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken> {
        let (lifetime, expires_in_days) = if extended {
            (
                Duration::days(self.config.remember_me_days),
                self.config.remember_me_days,
            )
        } else {
            (Duration::hours(SESSION_TOKEN_HOURS), 1)
        };
        let expires_at = now.checked_add_signed(lifetime).ok_or_else(|| Error::Internal {
            message: format!("token expiry overflows from {now}"),
        })?;

        let claims = Claims {
            sub: account_id.to_string(),
            name: username.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        Ok(IssuedToken {
            token,
            expires_at,
            expires_in_days,
        })
    }

    /// Verifies signature, structure and expiry, returning the embedded identity.
    pub fn verify(&self, token: &str) -> Result<Principal> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("Token validation failed: {}", e);
            match e.kind() {
                ErrorKind::ExpiredSignature => Error::TokenExpired,
                _ => Error::InvalidToken,
            }
        })?;
        Principal::from_claims(&data.claims)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::test_token_issuer;

    fn tamper_signature(token: &str) -> String {
        let (head, signature) = token.rsplit_once('.').unwrap();
        let mut chars: Vec<char> = signature.chars().collect();
        chars[10] = if chars[10] == 'A' { 'B' } else { 'A' };
        format!("{head}.{}", chars.into_iter().collect::<String>())
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let issuer = test_token_issuer();
        let issued = issuer.issue(7, "nana", false).unwrap();

        let principal = issuer.verify(&issued.token).unwrap();
        assert_eq!(principal.account_id, 7);
        assert_eq!(principal.username, "nana");
    }

    #[test]
    fn test_session_and_extended_lifetimes() {
        let issuer = test_token_issuer();
        let now = Utc::now();

        let session = issuer.issue_at(1, "nana", false, now).unwrap();
        assert_eq!(session.expires_in_days, 1);
        assert_eq!(session.expires_at, now + Duration::hours(24));

        let extended = issuer.issue_at(1, "nana", true, now).unwrap();
        assert_eq!(extended.expires_in_days, 30);
        assert_eq!(extended.expires_at, now + Duration::days(30));
    }

    #[test]
    fn test_token_valid_until_near_end_of_window() {
        let issuer = test_token_issuer();
        // Issued almost 30 days ago: one minute of validity left
        let issued_at = Utc::now() - Duration::days(30) + Duration::minutes(1);
        let issued = issuer.issue_at(3, "nana", true, issued_at).unwrap();
        assert_eq!(issuer.verify(&issued.token).unwrap().account_id, 3);
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = test_token_issuer();
        let issued = issuer
            .issue_at(1, "nana", false, Utc::now() - Duration::hours(25))
            .unwrap();
        assert!(matches!(issuer.verify(&issued.token), Err(Error::TokenExpired)));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let issuer = test_token_issuer();
        let issued = issuer.issue(1, "nana", true).unwrap();
        let tampered = tamper_signature(&issued.token);
        assert_ne!(tampered, issued.token);
        assert!(matches!(issuer.verify(&tampered), Err(Error::InvalidToken)));
    }

    #[test]
    fn test_swapped_claims_rejected() {
        let issuer = test_token_issuer();
        let mine = issuer.issue(1, "nana", true).unwrap().token;
        let other = issuer.issue(2, "pop", true).unwrap().token;

        // Payload of one token with the signature of another
        let mut mine_parts = mine.split('.');
        let other_parts: Vec<&str> = other.split('.').collect();
        let header = mine_parts.next().unwrap();
        let forged = format!("{header}.{}.{}", other_parts[1], mine.rsplit('.').next().unwrap());
        assert!(matches!(issuer.verify(&forged), Err(Error::InvalidToken)));
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let issuer = test_token_issuer();
        let other = TokenIssuer::new(TokenConfig::new([b'z'; 40], 30).unwrap());
        let token = other.issue(1, "nana", true).unwrap().token;
        assert!(matches!(issuer.verify(&token), Err(Error::InvalidToken)));
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let issuer = test_token_issuer();
        for token in ["", ".", "..", "not-a-token", "a.b.c", "a.b"] {
            assert!(
                matches!(issuer.verify(token), Err(Error::InvalidToken)),
                "{token:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_non_numeric_subject_rejected() {
        let claims = Claims {
            sub: "abc".to_string(),
            name: "nana".to_string(),
            iat: 0,
            exp: 0,
        };
        assert!(matches!(Principal::from_claims(&claims), Err(Error::InvalidToken)));
    }

    #[test]
    fn test_config_rejects_short_secret() {
        assert!(matches!(
            TokenConfig::new("short", 30),
            Err(Error::Config { .. })
        ));
        assert!(matches!(
            TokenConfig::new([b'k'; 32], 0),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_config_caps_remember_me_lifetime() {
        let longest = TokenConfig::new([b'k'; 32], TokenConfig::MAX_REMEMBER_ME_DAYS).unwrap();
        let issued = TokenIssuer::new(longest).issue(1, "nana", true).unwrap();
        assert_eq!(issued.expires_in_days, 3650);

        for days in [TokenConfig::MAX_REMEMBER_ME_DAYS + 1, i64::MAX / 86_400, i64::MAX] {
            assert!(
                matches!(TokenConfig::new([b'k'; 32], days), Err(Error::Config { .. })),
                "{days} days should be rejected"
            );
        }
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let config = TokenConfig::new("0123456789abcdef0123456789abcdef", 30).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("0123456789abcdef"));
    }
}
