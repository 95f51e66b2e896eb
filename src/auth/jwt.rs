//! JWT token handling

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;
use crate::config::AuthConfig;
use crate::error::{Error, Result};

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    /// Issued at
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
}

impl Claims {
    pub fn new(email: &str, issued_at: DateTime<Utc>, ttl_secs: i64) -> Self {
        let iat = issued_at.timestamp();
        Self {
            sub: email.to_string(),
            iat,
            exp: iat + ttl_secs,
        }
    }

    /// Check if token is expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Issues and verifies session tokens.
///
/// Holds every configured signing key by id. New tokens are signed with the
/// active key and carry its id in the header, so rotating keys does not
/// invalidate tokens signed by a key that is still listed.
pub struct TokenService {
    keys: HashMap<String, KeyPair>,
    active_kid: String,
    ttl_secs: i64,
}

impl TokenService {
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let keys: HashMap<String, KeyPair> = config
            .keys
            .iter()
            .map(|k| {
                let pair = KeyPair {
                    encoding: EncodingKey::from_secret(k.secret.as_bytes()),
                    decoding: DecodingKey::from_secret(k.secret.as_bytes()),
                };
                (k.kid.clone(), pair)
            })
            .collect();

        if !keys.contains_key(&config.active_key) {
            return Err(Error::Config(format!(
                "No signing key named '{}'",
                config.active_key
            )));
        }

        Ok(Self {
            keys,
            active_kid: config.active_key.clone(),
            ttl_secs: config.token_ttl_secs,
        })
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Create a token for `email` valid from now
    pub fn issue(&self, email: &str) -> Result<String> {
        self.issue_at(email, Utc::now())
    }

    /// Create a token as if issued at `issued_at`
    pub fn issue_at(&self, email: &str, issued_at: DateTime<Utc>) -> Result<String> {
        let key = self
            .keys
            .get(&self.active_kid)
            .ok_or_else(|| Error::Config(format!("No signing key named '{}'", self.active_kid)))?;

        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(self.active_kid.clone());

        let claims = Claims::new(email, issued_at, self.ttl_secs);
        Ok(encode(&header, &claims, &key.encoding)?)
    }

    /// Check signature and expiry, returning the embedded email
    pub fn verify(&self, token: &str) -> std::result::Result<String, AuthError> {
        self.decode_claims(token).map(|claims| claims.sub)
    }

    /// Check signature and expiry, returning all claims
    pub fn decode_claims(&self, token: &str) -> std::result::Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::Malformed)?;
        if header.alg != Algorithm::HS256 {
            return Err(AuthError::Malformed);
        }

        let key = header
            .kid
            .as_deref()
            .and_then(|kid| self.keys.get(kid))
            .ok_or(AuthError::Malformed)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<Claims>(token, &key.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Malformed,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SigningKey;

    fn auth_config(keys: &[(&str, &str)], active: &str) -> AuthConfig {
        AuthConfig {
            active_key: active.to_string(),
            keys: keys
                .iter()
                .map(|(kid, secret)| SigningKey {
                    kid: kid.to_string(),
                    secret: secret.to_string(),
                })
                .collect(),
            ..AuthConfig::default()
        }
    }

    fn service() -> TokenService {
        TokenService::from_config(&auth_config(&[("primary", "test-secret")], "primary"))
            .expect("Failed to build token service")
    }

    #[test]
    fn test_issue_and_verify_token() {
        let tokens = service();
        let token = tokens.issue("a@x.com").expect("Failed to create token");
        assert_eq!(tokens.verify(&token), Ok("a@x.com".to_string()));
    }

    #[test]
    fn test_claims_span_ttl() {
        let tokens = service();
        let token = tokens.issue("a@x.com").unwrap();
        let claims = tokens.decode_claims(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_expired_token() {
        let tokens = service();
        let issued = Utc::now() - chrono::Duration::seconds(3601);
        let token = tokens.issue_at("a@x.com", issued).unwrap();
        assert_eq!(tokens.verify(&token), Err(AuthError::Expired));
    }

    #[test]
    fn test_invalid_token() {
        let tokens = service();
        assert_eq!(tokens.verify("invalid.token.here"), Err(AuthError::Malformed));
        assert_eq!(tokens.verify(""), Err(AuthError::Malformed));
    }

    #[test]
    fn test_wrong_secret_is_malformed() {
        let other = TokenService::from_config(&auth_config(&[("primary", "other-secret")], "primary"))
            .unwrap();
        let token = other.issue("a@x.com").unwrap();
        assert_eq!(service().verify(&token), Err(AuthError::Malformed));
    }

    #[test]
    fn test_rotated_key_still_verifies() {
        let old = TokenService::from_config(&auth_config(&[("v1", "one")], "v1")).unwrap();
        let token = old.issue("a@x.com").unwrap();

        let rotated =
            TokenService::from_config(&auth_config(&[("v1", "one"), ("v2", "two")], "v2")).unwrap();
        assert_eq!(rotated.verify(&token), Ok("a@x.com".to_string()));

        let fresh = rotated.issue("b@x.com").unwrap();
        assert_eq!(decode_header(&fresh).unwrap().kid.as_deref(), Some("v2"));
        assert_eq!(old.verify(&fresh), Err(AuthError::Malformed));
    }

    #[test]
    fn test_token_without_kid_is_malformed() {
        let claims = Claims::new("a@x.com", Utc::now(), 3600);
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(service().verify(&token), Err(AuthError::Malformed));
    }

    #[test]
    fn test_missing_active_key() {
        let result = TokenService::from_config(&auth_config(&[("v1", "one")], "v2"));
        assert!(result.is_err());
    }
}
