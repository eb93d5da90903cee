//! 토큰 수명주기 통합 테스트
//!
//! 설정 로드 → 키 생성 → 발급 → 디코딩 → 만료 검증 흐름

use authgate_core::{
    AppConfig, Identity, SigningKey, TokenCodec, TokenError, TokenValidator,
};
use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;

const SECRET_B64: &str = "MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3ODlhYmNkZWY=";

fn key() -> SigningKey {
    SigningKey::from_bytes(b"0123456789abcdef0123456789abcdef").unwrap()
}

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

#[test]
fn test_configured_codec_issues_verifiable_tokens() {
    let config = AppConfig::from_toml(&format!(
        r#"
        [jwt]
        secret = "{SECRET_B64}"
        expiration_secs = 3600
        "#
    ))
    .unwrap();

    let codec = TokenCodec::new(config.jwt.signing_key().unwrap())
        .with_lifetimes(config.jwt.lifetimes().unwrap());
    let validator = TokenValidator::from_codec(codec.clone());

    let pair = codec.issue_pair("alice", 42).unwrap();
    assert_eq!(pair.expires_in, 3600);

    let identity = validator.verify(&pair.access_token).unwrap();
    assert_eq!(identity.subject, "alice");
    assert_eq!(identity.user_id, 42);
    assert!(validator.validate(&pair.refresh_token, "alice"));
}

#[test]
fn test_token_from_one_key_rejected_by_another() {
    let issuer = TokenCodec::new(key());
    let other = TokenValidator::new(
        SigningKey::from_bytes(b"another-32-byte-secret-for-tests").unwrap(),
    );

    let token = issuer.issue("alice", 42, Duration::hours(1)).unwrap();
    assert!(matches!(
        other.verify(&token),
        Err(TokenError::SignatureInvalid)
    ));
    assert!(!other.validate(&token, "alice"));
}

#[test]
fn test_expiry_is_judged_against_supplied_clock() {
    let codec = TokenCodec::new(key());
    let validator = TokenValidator::from_codec(codec.clone());
    let token = codec
        .issue_at("alice", 42, Duration::seconds(10), at(1_000))
        .unwrap();

    assert!(validator.verify_at(&token, at(1_009)).is_ok());
    assert!(matches!(
        validator.verify_at(&token, at(1_010)),
        Err(TokenError::Expired)
    ));
    // 만료 후에도 디코딩은 가능
    assert_eq!(codec.decode(&token).unwrap().user_id, 42);
}

proptest! {
    #[test]
    fn prop_decode_returns_issued_identity(
        subject in "[a-zA-Z0-9_]{1,32}",
        user_id in 1i64..i64::MAX,
        issued in 0i64..4_000_000_000,
        ttl in 1i64..31_536_000,
    ) {
        let codec = TokenCodec::new(key());
        let token = codec
            .issue_at(&subject, user_id, Duration::seconds(ttl), at(issued))
            .unwrap();

        let identity: Identity = codec.decode(&token).unwrap();
        prop_assert_eq!(&identity.subject, &subject);
        prop_assert_eq!(identity.user_id, user_id);
        prop_assert_eq!(identity.issued_at, at(issued));
        prop_assert_eq!(identity.expires_at, at(issued + ttl));
    }

    #[test]
    fn prop_truncated_token_never_decodes(cut in 1usize..40) {
        let codec = TokenCodec::new(key());
        let token = codec.issue("alice", 42, Duration::hours(1)).unwrap();
        let truncated = &token[..token.len() - cut];

        prop_assert!(codec.decode(truncated).is_err());
    }
}
