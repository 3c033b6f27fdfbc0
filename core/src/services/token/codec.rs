//! JWT signing and verification for access and refresh tokens

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::token::{TokenClaims, TokenType};
use crate::errors::TokenError;
use crate::services::clock::Clock;

use super::config::TokenCodecConfig;

const ALGORITHM: Algorithm = Algorithm::HS512;

/// Payload as it travels inside the JWT
///
/// `iat`, `exp` and `jti` exist only on the wire. `jti` keeps two tokens
/// minted for the same user within one second distinct, which matters
/// because refresh tokens double as session keys.
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    username: String,
    admin: bool,
    #[serde(rename = "type")]
    token_type: TokenType,
    iat: i64,
    exp: i64,
    jti: String,
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Signs and verifies the two token kinds, each with its own secret
pub struct TokenCodec {
    config: TokenCodecConfig,
    access_keys: KeyPair,
    refresh_keys: KeyPair,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Creates a new codec
    ///
    /// # Arguments
    ///
    /// * `config` - Secrets and lifetimes
    /// * `clock` - Time source for `iat`/`exp` and for expiry checks
    pub fn new(config: TokenCodecConfig, clock: Arc<dyn Clock>) -> Self {
        let access_keys = KeyPair::from_secret(&config.access_secret);
        let refresh_keys = KeyPair::from_secret(&config.refresh_secret);

        // Expiry is checked against the injected clock after decoding.
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            config,
            access_keys,
            refresh_keys,
            validation,
            clock,
        }
    }

    /// Configured lifetime for a token kind
    pub fn ttl(&self, token_type: TokenType) -> Duration {
        match token_type {
            TokenType::Access => self.config.access_ttl(),
            TokenType::Refresh => self.config.refresh_ttl(),
        }
    }

    /// Signs claims with the configured lifetime for their kind
    pub fn issue(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        self.sign(claims, self.ttl(claims.token_type))
    }

    /// Signs claims with an explicit lifetime
    ///
    /// The secret is chosen by `claims.token_type`.
    pub fn sign(&self, claims: &TokenClaims, ttl: Duration) -> Result<String, TokenError> {
        let now = self.clock.now();
        let wire = WireClaims {
            username: claims.username.clone(),
            admin: claims.is_admin,
            token_type: claims.token_type,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(ALGORITHM), &wire, &self.keys(claims.token_type).encoding)
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to sign {} token", claims.token_type);
                TokenError::GenerationFailed
            })
    }

    /// Verifies a token expected to be of `expected` kind
    ///
    /// # Returns
    ///
    /// * `Ok(TokenClaims)` - Identity without transport fields
    /// * `Err(TokenError::Malformed)` - Not a decodable token
    /// * `Err(TokenError::SignatureInvalid)` - MAC mismatch or foreign algorithm
    /// * `Err(TokenError::Expired)` - `exp` is not in the future
    /// * `Err(TokenError::WrongType)` - Decoded kind differs from `expected`
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<TokenClaims, TokenError> {
        let data = decode::<WireClaims>(token, &self.keys(expected).decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidAlgorithmName => TokenError::SignatureInvalid,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?;

        let wire = data.claims;
        if wire.exp <= self.clock.now().timestamp() {
            return Err(TokenError::Expired);
        }
        if wire.token_type != expected {
            return Err(TokenError::WrongType);
        }

        Ok(TokenClaims {
            username: wire.username,
            is_admin: wire.admin,
            token_type: wire.token_type,
        })
    }

    fn keys(&self, token_type: TokenType) -> &KeyPair {
        match token_type {
            TokenType::Access => &self.access_keys,
            TokenType::Refresh => &self.refresh_keys,
        }
    }
}
