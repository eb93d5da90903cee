//! 만료 및 subject 검증.

use chrono::{DateTime, Utc};

use super::claims::Identity;
use super::codec::{TokenCodec, TokenError};
use super::key::SigningKey;

/// 토큰 검증기.
///
/// [`TokenCodec`]의 서명 검증 위에 만료 판정을 얹습니다.
/// 만료는 `now >= exp`로 판정하며 시계 오차 허용치는 없습니다.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    codec: TokenCodec,
}

impl TokenValidator {
    pub fn new(key: SigningKey) -> Self {
        Self::from_codec(TokenCodec::new(key))
    }

    pub fn from_codec(codec: TokenCodec) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// 디코딩된 신원 정보가 만료되었는지 확인.
    pub fn check_expiry(&self, identity: &Identity) -> bool {
        self.check_expiry_at(identity, Utc::now())
    }

    pub fn check_expiry_at(&self, identity: &Identity, now: DateTime<Utc>) -> bool {
        identity.is_expired_at(now)
    }

    /// 토큰의 subject가 기대값과 같고 만료되지 않았는지 확인.
    ///
    /// 디코딩 실패를 포함한 모든 실패는 `false`입니다.
    pub fn validate(&self, token: &str, expected_subject: &str) -> bool {
        self.validate_at(token, expected_subject, Utc::now())
    }

    pub fn validate_at(&self, token: &str, expected_subject: &str, now: DateTime<Utc>) -> bool {
        match self.codec.decode(token) {
            Ok(identity) => identity.subject == expected_subject && !identity.is_expired_at(now),
            Err(_) => false,
        }
    }

    /// 서명과 만료를 모두 검증하여 신원 정보 반환.
    ///
    /// `decode` 후 `check_expiry`를 호출하는 것과 같습니다.
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError> {
        let identity = self.codec.decode(token)?;
        if self.check_expiry_at(&identity, now) {
            return Err(TokenError::Expired);
        }
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn validator() -> TokenValidator {
        TokenValidator::new(SigningKey::from_bytes(b"0123456789abcdef0123456789abcdef").unwrap())
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_validate_subject() {
        let validator = validator();
        let token = validator
            .codec()
            .issue("alice", 42, Duration::hours(1))
            .unwrap();

        assert!(validator.validate(&token, "alice"));
        assert!(!validator.validate(&token, "bob"));
    }

    #[test]
    fn test_validate_garbage_is_false() {
        assert!(!validator().validate("invalid.token.here", "alice"));
        assert!(!validator().validate("", "alice"));
    }

    #[test]
    fn test_check_expiry_boundary() {
        let validator = validator();
        let token = validator
            .codec()
            .issue_at("alice", 42, Duration::seconds(60), at(1_000))
            .unwrap();

        let identity = validator.codec().decode(&token).unwrap();

        assert!(!validator.check_expiry_at(&identity, at(1_000)));
        assert!(!validator.check_expiry_at(&identity, at(1_059)));
        assert!(validator.check_expiry_at(&identity, at(1_060)));
        assert!(!validator.validate_at(&token, "alice", at(1_060)));
        assert!(validator.validate_at(&token, "alice", at(1_030)));
    }

    #[test]
    fn test_check_expiry_fresh_identity() {
        let validator = validator();
        let token = validator
            .codec()
            .issue("alice", 42, Duration::hours(1))
            .unwrap();
        let identity = validator.codec().decode(&token).unwrap();

        assert!(!validator.check_expiry(&identity));
    }

    #[test]
    fn test_verify_malformed() {
        assert!(matches!(validator().verify("a.b"), Err(TokenError::Malformed)));
    }

    #[test]
    fn test_verify_rejects_expired() {
        let validator = validator();
        let token = validator
            .codec()
            .issue_at("alice", 42, Duration::seconds(60), at(1_000))
            .unwrap();

        assert!(matches!(
            validator.verify_at(&token, at(2_000)),
            Err(TokenError::Expired)
        ));

        let identity = validator.verify_at(&token, at(1_001)).unwrap();
        assert_eq!(identity.user_id, 42);
    }
}
