//! 토큰 클레임과 신원 정보.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::TokenError;

/// 토큰에 서명되어 들어가는 클레임.
///
/// ```json
/// {"sub": "alice", "jti": "42", "userId": 42, "iat": 1735689600, "exp": 1735693200}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 이름
    pub sub: String,
    /// JWT ID - 사용자 ID에서 파생
    pub jti: String,
    /// 사용자 ID
    #[serde(rename = "userId")]
    pub user_id: i64,
    /// Issued At (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// 서명 검증 이후 클레임 역직렬화용.
///
/// 누락된 클레임을 이름으로 보고하기 위해 모든 필드가 선택적입니다.
#[derive(Debug, Deserialize)]
pub(crate) struct RawClaims {
    sub: Option<String>,
    jti: Option<String>,
    #[serde(rename = "userId")]
    user_id: Option<i64>,
    iat: Option<i64>,
    exp: Option<i64>,
}

impl RawClaims {
    pub(crate) fn into_identity(self) -> Result<Identity, TokenError> {
        let subject = self
            .sub
            .filter(|s| !s.is_empty())
            .ok_or(TokenError::MissingClaim("sub"))?;
        self.jti.ok_or(TokenError::MissingClaim("jti"))?;
        let user_id = self.user_id.ok_or(TokenError::MissingClaim("userId"))?;
        let iat = self.iat.ok_or(TokenError::MissingClaim("iat"))?;
        let exp = self.exp.ok_or(TokenError::MissingClaim("exp"))?;

        Ok(Identity {
            subject,
            user_id,
            issued_at: DateTime::from_timestamp(iat, 0).ok_or(TokenError::Malformed)?,
            expires_at: DateTime::from_timestamp(exp, 0).ok_or(TokenError::Malformed)?,
        })
    }
}

/// 토큰에 담긴 신원 정보.
///
/// 발급 시 생성되며 이후 변경되지 않습니다. 갱신이 필요하면 새 토큰을 발급합니다.
/// 시각은 초 단위로 절삭되어 토큰의 `iat`/`exp`와 정확히 일치합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// 사용자 이름 (고유)
    pub subject: String,
    /// 사용자 ID
    pub user_id: i64,
    /// 발급 시각
    pub issued_at: DateTime<Utc>,
    /// 만료 시각
    pub expires_at: DateTime<Utc>,
}

impl Identity {
    pub(crate) fn new(
        subject: impl Into<String>,
        user_id: i64,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let issued_at = DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now);
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            subject: subject.into(),
            user_id,
            issued_at,
            expires_at,
        }
    }

    /// 서명할 클레임으로 변환.
    pub fn to_claims(&self) -> Claims {
        Claims {
            sub: self.subject.clone(),
            jti: self.user_id.to_string(),
            user_id: self.user_id,
            iat: self.issued_at.timestamp(),
            exp: self.expires_at.timestamp(),
        }
    }

    /// `now`가 만료 시각 이후(같은 시각 포함)인지 확인.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_identity_truncates_to_seconds() {
        let now = DateTime::from_timestamp(1_735_689_600, 999_000_000).unwrap();
        let identity = Identity::new("alice", 42, now, Duration::seconds(3600));

        assert_eq!(identity.issued_at, at(1_735_689_600));
        assert_eq!(identity.expires_at, at(1_735_693_200));
    }

    #[test]
    fn test_claims_shape() {
        let identity = Identity::new("alice", 42, at(1_735_689_600), Duration::seconds(60));
        let json = serde_json::to_value(identity.to_claims()).unwrap();

        assert_eq!(json["sub"], "alice");
        assert_eq!(json["jti"], "42");
        assert_eq!(json["userId"], 42);
        assert_eq!(json["iat"], 1_735_689_600);
        assert_eq!(json["exp"], 1_735_689_660);
    }

    #[test]
    fn test_expiry_boundary() {
        let identity = Identity::new("alice", 42, at(1000), Duration::seconds(10));

        assert!(!identity.is_expired_at(at(1009)));
        assert!(identity.is_expired_at(at(1010)));
        assert!(identity.is_expired_at(at(1011)));
    }

    #[test]
    fn test_missing_claims_are_named() {
        let raw: RawClaims =
            serde_json::from_str(r#"{"sub":"alice","jti":"1","iat":1,"exp":2}"#).unwrap();
        assert!(matches!(
            raw.into_identity(),
            Err(TokenError::MissingClaim("userId"))
        ));

        let raw: RawClaims =
            serde_json::from_str(r#"{"sub":"","jti":"1","userId":1,"iat":1,"exp":2}"#).unwrap();
        assert!(matches!(raw.into_identity(), Err(TokenError::MissingClaim("sub"))));

        let raw: RawClaims =
            serde_json::from_str(r#"{"sub":"bob","jti":"1","userId":1,"iat":1}"#).unwrap();
        assert!(matches!(raw.into_identity(), Err(TokenError::MissingClaim("exp"))));
    }
}
