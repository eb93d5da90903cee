//! 토큰 발급 및 디코딩.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Header, Validation};
use serde::{Deserialize, Serialize};

use super::claims::{Identity, RawClaims};
use super::key::SigningKey;

/// `TokenPair::token_type` 값.
pub const BEARER_TOKEN_TYPE: &str = "Bearer";

/// 토큰 처리 에러.
///
/// 발급 시의 `Signing`을 제외하면 모두 요청 단위 에러이며,
/// 요청 파이프라인을 중단시키지 않고 "미인증"으로 처리됩니다.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// 구조가 잘못됨 (세그먼트 수, base64, JSON)
    #[error("malformed token")]
    Malformed,
    /// 서명 불일치 또는 허용되지 않은 알고리즘
    #[error("token signature is invalid")]
    SignatureInvalid,
    /// 만료됨
    #[error("token has expired")]
    Expired,
    /// 필수 클레임 누락
    #[error("token is missing claim `{0}`")]
    MissingClaim(&'static str),
    /// 서명 실패 (유효한 키에서는 발생하지 않음)
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl TokenError {
    /// 로그/메트릭 라벨.
    pub fn reason(&self) -> &'static str {
        match self {
            TokenError::Malformed => "malformed",
            TokenError::SignatureInvalid => "signature_invalid",
            TokenError::Expired => "expired",
            TokenError::MissingClaim(_) => "missing_claim",
            TokenError::Signing(_) => "signing",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => TokenError::SignatureInvalid,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    }
}

/// Access/Refresh 토큰 수명.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    access: Duration,
    refresh: Duration,
}

impl TokenLifetimes {
    pub fn new(access: Duration, refresh: Duration) -> Self {
        Self { access, refresh }
    }

    pub fn access(&self) -> Duration {
        self.access
    }

    pub fn refresh(&self) -> Duration {
        self.refresh
    }
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self::new(
            Duration::seconds(crate::config::DEFAULT_ACCESS_TTL_SECS),
            Duration::seconds(crate::config::DEFAULT_REFRESH_TTL_SECS),
        )
    }
}

/// Access Token + Refresh Token 페어.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access Token
    pub access_token: String,
    /// Refresh Token
    pub refresh_token: String,
    /// Access Token 만료까지 남은 시간 (초)
    pub expires_in: i64,
    /// 토큰 타입 (항상 "Bearer")
    pub token_type: String,
}

/// HS256 토큰 코덱.
///
/// 서명 검증과 클레임 추출을 한 번에 수행하며, 서명이 확인되기 전에는
/// 어떤 클레임도 읽지 않습니다. 만료는 여기서 검사하지 않습니다
/// ([`TokenValidator`](super::TokenValidator) 참고).
#[derive(Clone)]
pub struct TokenCodec {
    key: SigningKey,
    header: Header,
    validation: Validation,
    lifetimes: TokenLifetimes,
}

impl TokenCodec {
    pub fn new(key: SigningKey) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            key,
            header: Header::new(Algorithm::HS256),
            validation,
            lifetimes: TokenLifetimes::default(),
        }
    }

    /// 기본 수명 설정.
    #[must_use]
    pub fn with_lifetimes(mut self, lifetimes: TokenLifetimes) -> Self {
        self.lifetimes = lifetimes;
        self
    }

    pub fn lifetimes(&self) -> TokenLifetimes {
        self.lifetimes
    }

    /// 현재 시각 기준으로 토큰 발급.
    pub fn issue(&self, subject: &str, user_id: i64, ttl: Duration) -> Result<String, TokenError> {
        self.issue_at(subject, user_id, ttl, Utc::now())
    }

    /// 지정한 시각 기준으로 토큰 발급.
    pub fn issue_at(
        &self,
        subject: &str,
        user_id: i64,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let identity = Identity::new(subject, user_id, now, ttl);
        self.sign(&identity)
    }

    /// 신원 정보에 서명하여 compact 문자열 생성.
    pub fn sign(&self, identity: &Identity) -> Result<String, TokenError> {
        jsonwebtoken::encode(&self.header, &identity.to_claims(), self.key.encoding())
            .map_err(TokenError::Signing)
    }

    /// Access Token 발급.
    pub fn issue_access(&self, subject: &str, user_id: i64) -> Result<String, TokenError> {
        self.issue(subject, user_id, self.lifetimes.access)
    }

    /// Refresh Token 발급.
    ///
    /// 클레임 형식은 Access Token과 같고 수명만 다릅니다.
    pub fn issue_refresh(&self, subject: &str, user_id: i64) -> Result<String, TokenError> {
        self.issue(subject, user_id, self.lifetimes.refresh)
    }

    /// 로그인 응답용 토큰 페어 발급.
    pub fn issue_pair(&self, subject: &str, user_id: i64) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue_access(subject, user_id)?,
            refresh_token: self.issue_refresh(subject, user_id)?,
            expires_in: self.lifetimes.access.num_seconds(),
            token_type: BEARER_TOKEN_TYPE.to_string(),
        })
    }

    /// 토큰 디코딩 및 서명 검증.
    ///
    /// 만료된 토큰도 서명이 유효하면 성공합니다.
    pub fn decode(&self, token: &str) -> Result<Identity, TokenError> {
        if token.split('.').count() != 3 {
            return Err(TokenError::Malformed);
        }

        let data = jsonwebtoken::decode::<RawClaims>(token, self.key.decoding(), &self.validation)?;
        data.claims.into_identity()
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.header.alg)
            .field("lifetimes", &self.lifetimes)
            .finish_non_exhaustive()
    }
}
