//! Unit tests for the token codec

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use crate::domain::entities::token::{TokenClaims, TokenType};
use crate::errors::TokenError;
use crate::services::clock::{Clock, FixedClock};
use crate::services::token::{TokenCodec, TokenCodecConfig};

const ACCESS_SECRET: &str = "test-access-secret";
const REFRESH_SECRET: &str = "test-refresh-secret";

fn config() -> TokenCodecConfig {
    TokenCodecConfig {
        access_secret: ACCESS_SECRET.to_string(),
        refresh_secret: REFRESH_SECRET.to_string(),
        access_token_expiry_seconds: 15 * 60,
        refresh_token_expiry_seconds: 7 * 24 * 60 * 60,
    }
}

fn codec_at_fixed_time() -> (TokenCodec, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2021, 3, 10, 0, 50, 43).unwrap()));
    (TokenCodec::new(config(), clock.clone()), clock)
}

#[test]
fn test_round_trip_strips_transport_fields() {
    let (codec, _) = codec_at_fixed_time();

    for claims in [
        TokenClaims::access("user2", false),
        TokenClaims::refresh("admin", true),
    ] {
        let token = codec.sign(&claims, Duration::minutes(5)).unwrap();
        let verified = codec.verify(&token, claims.token_type).unwrap();
        assert_eq!(verified, claims);
    }
}

#[test]
fn test_issue_uses_configured_ttl() {
    let (codec, clock) = codec_at_fixed_time();
    let token = codec.issue(&TokenClaims::access("user2", false)).unwrap();

    clock.advance(Duration::minutes(14));
    assert!(codec.verify(&token, TokenType::Access).is_ok());

    clock.advance(Duration::minutes(1));
    assert_eq!(codec.verify(&token, TokenType::Access), Err(TokenError::Expired));
}

#[test]
fn test_same_second_tokens_differ() {
    let (codec, _) = codec_at_fixed_time();
    let claims = TokenClaims::refresh("user2", false);
    let first = codec.issue(&claims).unwrap();
    let second = codec.issue(&claims).unwrap();
    assert_ne!(first, second);
}

#[test]
fn test_refresh_token_rejected_as_access() {
    let (codec, _) = codec_at_fixed_time();
    let refresh = codec.issue(&TokenClaims::refresh("user2", false)).unwrap();

    // signed with the other secret
    assert_eq!(
        codec.verify(&refresh, TokenType::Access),
        Err(TokenError::SignatureInvalid)
    );
}

#[test]
fn test_wrong_type_with_shared_secret() {
    let clock = Arc::new(FixedClock::new(Utc::now()));
    let mut shared = config();
    shared.refresh_secret = shared.access_secret.clone();
    let codec = TokenCodec::new(shared, clock);

    let refresh = codec.issue(&TokenClaims::refresh("user2", false)).unwrap();
    assert_eq!(codec.verify(&refresh, TokenType::Access), Err(TokenError::WrongType));
}

#[test]
fn test_tampered_signature() {
    let (codec, _) = codec_at_fixed_time();
    let token = codec.issue(&TokenClaims::access("user2", false)).unwrap();

    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    let sig = parts[2].clone();
    let flipped = if sig.starts_with('A') { "B" } else { "A" };
    parts[2] = format!("{}{}", flipped, &sig[1..]);
    let tampered = parts.join(".");

    assert_eq!(
        codec.verify(&tampered, TokenType::Access),
        Err(TokenError::SignatureInvalid)
    );
}

#[test]
fn test_tampered_payload_fails_signature() {
    let (codec, _) = codec_at_fixed_time();
    let user_token = codec.issue(&TokenClaims::access("user2", false)).unwrap();
    let admin_token = codec.issue(&TokenClaims::access("user2", true)).unwrap();

    let user_parts: Vec<&str> = user_token.split('.').collect();
    let admin_parts: Vec<&str> = admin_token.split('.').collect();
    let spliced = format!("{}.{}.{}", user_parts[0], admin_parts[1], user_parts[2]);

    assert_eq!(
        codec.verify(&spliced, TokenType::Access),
        Err(TokenError::SignatureInvalid)
    );
}

#[test]
fn test_foreign_algorithm_rejected() {
    let (codec, clock) = codec_at_fixed_time();
    let now = clock.now().timestamp();
    let payload = serde_json::json!({
        "username": "user2",
        "admin": true,
        "type": "access",
        "iat": now,
        "exp": now + 600,
        "jti": "x",
    });
    let token = encode(
        &Header::new(Algorithm::HS256),
        &payload,
        &EncodingKey::from_secret(ACCESS_SECRET.as_bytes()),
    )
    .unwrap();

    assert_eq!(
        codec.verify(&token, TokenType::Access),
        Err(TokenError::SignatureInvalid)
    );
}

#[test]
fn test_malformed_inputs() {
    let (codec, _) = codec_at_fixed_time();
    for garbage in ["", "abc", "a.b", "a.b.c", "not a token at all"] {
        assert_eq!(
            codec.verify(garbage, TokenType::Access),
            Err(TokenError::Malformed),
            "input {:?}",
            garbage
        );
    }
}

#[test]
fn test_unknown_token_type_is_malformed() {
    let (codec, clock) = codec_at_fixed_time();
    let now = clock.now().timestamp();
    let payload = serde_json::json!({
        "username": "user2",
        "admin": false,
        "type": "session",
        "iat": now,
        "exp": now + 600,
        "jti": "x",
    });
    let token = encode(
        &Header::new(Algorithm::HS512),
        &payload,
        &EncodingKey::from_secret(ACCESS_SECRET.as_bytes()),
    )
    .unwrap();

    assert_eq!(codec.verify(&token, TokenType::Access), Err(TokenError::Malformed));
}

#[test]
fn test_expiry_boundary_is_exclusive() {
    let (codec, clock) = codec_at_fixed_time();
    let token = codec
        .sign(&TokenClaims::refresh("user2", false), Duration::seconds(60))
        .unwrap();

    clock.advance(Duration::seconds(59));
    assert!(codec.verify(&token, TokenType::Refresh).is_ok());

    // exp == now counts as expired
    clock.advance(Duration::seconds(1));
    assert_eq!(codec.verify(&token, TokenType::Refresh), Err(TokenError::Expired));
}
