//! 설정 관리.
//!
//! 설정은 프로세스 시작 시 한 번 로드되며 핫 리로드는 지원하지 않습니다.
//!
//! 로드 순서 (뒤의 소스가 앞을 덮어씀):
//! 1. 기본값
//! 2. 설정 파일 (없으면 건너뜀)
//! 3. `AUTHGATE__` 접두사 환경 변수 (예: `AUTHGATE__JWT__SECRET`)

use std::path::Path;

use chrono::Duration;
use config::builder::{ConfigBuilder, DefaultState};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use crate::error::ConfigurationError;
use crate::token::{SigningKey, TokenLifetimes};

/// Access Token 기본 수명 (초) - 24시간
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 86_400;

/// Refresh Token 기본 수명 (초) - 7일
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 604_800;

/// 기본 설정 파일 경로
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 애플리케이션 설정.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// JWT 설정
    #[serde(default)]
    pub jwt: JwtConfig,
    /// 데이터베이스 설정
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// `host:port` 형식의 바인딩 주소.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// JWT 설정.
///
/// `secret`은 base64로 인코딩된 HMAC 키입니다. Debug 출력에서는 가려집니다.
#[derive(Debug, Deserialize)]
pub struct JwtConfig {
    /// 서명 비밀 키 (base64)
    #[serde(default = "empty_secret", deserialize_with = "deserialize_secret")]
    pub secret: SecretString,
    /// Access Token 수명 (초)
    #[serde(default = "default_access_ttl")]
    pub expiration_secs: i64,
    /// Refresh Token 수명 (초)
    #[serde(default = "default_refresh_ttl")]
    pub refresh_expiration_secs: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: empty_secret(),
            expiration_secs: DEFAULT_ACCESS_TTL_SECS,
            refresh_expiration_secs: DEFAULT_REFRESH_TTL_SECS,
        }
    }
}

impl JwtConfig {
    /// 서명 키 생성.
    ///
    /// 비밀 키가 없거나 base64가 아니거나 너무 짧으면 `ConfigurationError`.
    pub fn signing_key(&self) -> Result<SigningKey, ConfigurationError> {
        SigningKey::from_base64_secret(&self.secret)
    }

    /// 토큰 수명 설정.
    pub fn lifetimes(&self) -> Result<TokenLifetimes, ConfigurationError> {
        let access = positive_secs("jwt.expiration_secs", self.expiration_secs)?;
        let refresh = positive_secs("jwt.refresh_expiration_secs", self.refresh_expiration_secs)?;
        Ok(TokenLifetimes::new(access, refresh))
    }
}

fn positive_secs(name: &'static str, value: i64) -> Result<Duration, ConfigurationError> {
    if value <= 0 {
        return Err(ConfigurationError::InvalidLifetime { name, value });
    }
    Duration::try_seconds(value).ok_or(ConfigurationError::InvalidLifetime { name, value })
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

fn default_access_ttl() -> i64 {
    DEFAULT_ACCESS_TTL_SECS
}

fn default_refresh_ttl() -> i64 {
    DEFAULT_REFRESH_TTL_SECS
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL 연결 URL. 없으면 인메모리 저장소 사용
    #[serde(default)]
    pub url: Option<String>,
    /// 최대 연결 수
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// 연결 획득 타임아웃 (초)
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    10
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let builder = Self::base_builder()?
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("AUTHGATE")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::from_builder(builder)
    }

    /// `AUTHGATE_CONFIG` 또는 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, ConfigurationError> {
        let path =
            std::env::var("AUTHGATE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(path)
    }

    /// TOML 문자열에서 설정을 로드합니다. 환경 변수는 읽지 않습니다.
    pub fn from_toml(source: &str) -> Result<Self, ConfigurationError> {
        let builder = Self::base_builder()?
            .add_source(config::File::from_str(source, config::FileFormat::Toml));
        Self::from_builder(builder)
    }

    fn base_builder() -> Result<ConfigBuilder<DefaultState>, ConfigurationError> {
        Ok(config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("jwt.expiration_secs", DEFAULT_ACCESS_TTL_SECS)?
            .set_default("jwt.refresh_expiration_secs", DEFAULT_REFRESH_TTL_SECS)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigurationError> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.jwt.lifetimes()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    const TEST_SECRET_B64: &str = "MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3ODlhYmNkZWY=";

    #[test]
    fn test_defaults_without_sources() {
        let config = AppConfig::from_toml("").unwrap();

        assert_eq!(config.server.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.jwt.expiration_secs, DEFAULT_ACCESS_TTL_SECS);
        assert_eq!(config.jwt.refresh_expiration_secs, DEFAULT_REFRESH_TTL_SECS);
        assert!(config.database.url.is_none());
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_missing_secret_is_configuration_error() {
        let config = AppConfig::from_toml("").unwrap();
        assert!(matches!(
            config.jwt.signing_key(),
            Err(ConfigurationError::MissingSecret)
        ));
    }

    #[test]
    fn test_jwt_section_from_file() {
        let config = AppConfig::from_toml(&format!(
            r#"
            [jwt]
            secret = "{TEST_SECRET_B64}"
            expiration_secs = 3600
            refresh_expiration_secs = 7200
            "#
        ))
        .unwrap();

        assert_eq!(config.jwt.secret.expose_secret(), TEST_SECRET_B64);
        assert!(config.jwt.signing_key().is_ok());

        let lifetimes = config.jwt.lifetimes().unwrap();
        assert_eq!(lifetimes.access().num_seconds(), 3600);
        assert_eq!(lifetimes.refresh().num_seconds(), 7200);
    }

    #[test]
    fn test_non_positive_ttl_rejected() {
        let result = AppConfig::from_toml(
            r#"
            [jwt]
            expiration_secs = 0
            "#,
        );
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidLifetime { name: "jwt.expiration_secs", value: 0 })
        ));
    }

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let config = AppConfig::from_toml(&format!("[jwt]\nsecret = \"{TEST_SECRET_B64}\"")).unwrap();
        let debug = format!("{:?}", config.jwt);
        assert!(!debug.contains(TEST_SECRET_B64));
    }
}
