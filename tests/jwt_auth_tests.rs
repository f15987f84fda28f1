// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication tests.
//!
//! Tokens issued for a user must decode to the same opaque user ID the
//! middleware hands to the validator.

use gym_checkin::middleware::auth::{create_jwt, Claims};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

#[test]
fn test_jwt_roundtrip() {
    let signing_key = b"test_signing_key_32_bytes_long!!";
    let user_id = "user-7f3a";

    let token = create_jwt(user_id, signing_key).expect("Failed to create JWT");

    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);
    let decoded = decode::<Claims>(&token, &key, &validation).expect("Failed to decode JWT");

    assert_eq!(decoded.claims.sub, user_id);
    assert!(decoded.claims.exp > decoded.claims.iat);
}

#[test]
fn test_jwt_wrong_key_rejected() {
    let token = create_jwt("U", b"test_signing_key_32_bytes_long!!").unwrap();

    let key = DecodingKey::from_secret(b"another_key_entirely_32_bytes!!!");
    let validation = Validation::new(Algorithm::HS256);

    assert!(decode::<Claims>(&token, &key, &validation).is_err());
}
