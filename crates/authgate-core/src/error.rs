//! 시작 단계 에러 타입.
//!
//! 요청 단위 에러(토큰, 비밀번호, 저장소)는 각 모듈에서 정의하고,
//! 여기에는 프로세스 기동을 막는 설정 에러만 둡니다.

use thiserror::Error;

/// 설정 에러.
///
/// 시작 시점에만 발생하며, 발생하면 프로세스는 기동하지 않습니다.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// 서명 키가 설정되지 않음
    #[error("JWT signing secret is not configured")]
    MissingSecret,

    /// 서명 키가 base64가 아님
    #[error("JWT signing secret is not valid base64: {0}")]
    InvalidSecretEncoding(#[from] base64::DecodeError),

    /// HS256에 비해 서명 키가 짧음
    #[error("JWT signing secret too short: expected at least {min} bytes, got {actual}")]
    WeakSecret { min: usize, actual: usize },

    /// TTL이 0 이하
    #[error("Invalid token lifetime for {name}: {value}s")]
    InvalidLifetime { name: &'static str, value: i64 },

    /// 설정 소스 로드/역직렬화 실패
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}
