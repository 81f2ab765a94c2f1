//! Tests for the signature codec.

use super::*;

const NOW: i64 = 1_760_000_000;
const BODY: &[u8] = br#"{"plan_id":"plan_1","phase":"running"}"#;

fn codec() -> SignatureCodec {
    SignatureCodec::new("8f742231b10e8888abcd99yyyzzz85a5").expect("codec")
}

/// Flips the lowest bit of the character at `index`.
fn flip_bit(signature: &str, index: usize) -> String {
    let mut bytes = signature.as_bytes().to_vec();
    bytes[index] ^= 0x01;
    String::from_utf8(bytes).expect("ascii stays ascii")
}

#[test]
fn test_sign_has_version_prefix_and_hex_digest() {
    let signature = codec().sign(NOW, BODY);
    let digest = signature.strip_prefix("v0=").expect("prefix");
    assert_eq!(digest.len(), 64);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_sign_matches_known_vector() {
    // Slack's published example: secret, timestamp and body below produce
    // this exact signature.
    let codec = SignatureCodec::new("8f742231b10e8888abcd99yyyzzz85a5").unwrap();
    let body = b"token=xyzz0WbapA4vBCDEFasx0q6G&team_id=T1DC2JH3J&team_domain=testteamnow&channel_id=G8PSS9T3V&channel_name=foobar&user_id=U2CERLKJA&user_name=roadrunner&command=%2Fwebhook-collect&text=&response_url=https%3A%2F%2Fhooks.slack.com%2Fcommands%2FT1DC2JH3J%2F397700885554%2F96rGlfmibIGlgcZRskXaIFfN&trigger_id=398738663015.47445629121.803a0bc887a14d10d2c447fce8b6703c";
    assert_eq!(
        codec.sign(1_531_420_618, body),
        "v0=a2114d57b48eac39b9ad189dd8316235a7b4a8d21a10bd27519666489c69b503"
    );
}

#[test]
fn test_verify_accepts_fresh_valid_signature() {
    let codec = codec();
    let signature = codec.sign(NOW, BODY);
    assert_eq!(codec.verify(NOW, BODY, &signature, NOW + 299), Ok(()));
    assert_eq!(codec.verify(NOW, BODY, &signature, NOW - 300), Ok(()));
    assert!(codec.is_valid(NOW, BODY, &signature, NOW));
}

#[test]
fn test_verify_rejects_stale_timestamp_even_with_valid_mac() {
    let codec = codec();
    let stale = NOW - 301;
    let signature = codec.sign(stale, BODY);
    assert_eq!(
        codec.verify(stale, BODY, &signature, NOW),
        Err(VerificationError::StaleRequest)
    );
    assert_eq!(
        codec.verify(stale, BODY, "garbage", NOW),
        Err(VerificationError::StaleRequest)
    );
}

#[test]
fn test_verify_rejects_future_timestamp_outside_window() {
    let codec = codec();
    let future = NOW + 301;
    let signature = codec.sign(future, BODY);
    assert_eq!(
        codec.verify(future, BODY, &signature, NOW),
        Err(VerificationError::StaleRequest)
    );
}

#[test]
fn test_verify_rejects_flipped_bit_anywhere() {
    let codec = codec();
    let signature = codec.sign(NOW, BODY);
    for index in 0..signature.len() {
        let tampered = flip_bit(&signature, index);
        assert_eq!(
            codec.verify(NOW, BODY, &tampered, NOW),
            Err(VerificationError::SignatureInvalid),
            "bit flip at {index} was accepted"
        );
    }
}

#[test]
fn test_verify_rejects_other_body_or_secret() {
    let codec = codec();
    let signature = codec.sign(NOW, BODY);
    assert_eq!(
        codec.verify(NOW, b"{}", &signature, NOW),
        Err(VerificationError::SignatureInvalid)
    );

    let other = SignatureCodec::new("another-secret").unwrap();
    assert_eq!(
        other.verify(NOW, BODY, &signature, NOW),
        Err(VerificationError::SignatureInvalid)
    );
}

#[test]
fn test_verify_rejects_malformed_signatures() {
    let codec = codec();
    for malformed in ["", "v0=", "v0=zz", "v1=abcd", "deadbeef", "v0=abc"] {
        assert_eq!(
            codec.verify(NOW, BODY, malformed, NOW),
            Err(VerificationError::SignatureInvalid),
            "{malformed:?} was accepted"
        );
    }
}

#[test]
fn test_verify_rejects_truncated_signature() {
    let codec = codec();
    let signature = codec.sign(NOW, BODY);
    let truncated = &signature[..signature.len() - 2];
    assert_eq!(
        codec.verify(NOW, BODY, truncated, NOW),
        Err(VerificationError::SignatureInvalid)
    );
}

#[test]
fn test_custom_replay_window() {
    let codec = codec().with_replay_window(10);
    let signature = codec.sign(NOW, BODY);
    assert!(codec.is_valid(NOW, BODY, &signature, NOW + 10));
    assert!(!codec.is_valid(NOW, BODY, &signature, NOW + 11));
}

#[test]
fn test_empty_secret_is_rejected() {
    assert!(matches!(
        SignatureCodec::new(""),
        Err(OrionError::InvalidInput { .. })
    ));
}

#[test]
fn test_debug_does_not_leak_secret() {
    let rendered = format!("{:?}", codec());
    assert!(!rendered.contains("8f742231"));
}

#[test]
fn test_status_codes() {
    assert_eq!(VerificationError::SignatureInvalid.status_code(), 401);
    assert_eq!(VerificationError::StaleRequest.status_code(), 400);
    assert_eq!(VerificationError::MissingHeaders.status_code(), 400);
}
