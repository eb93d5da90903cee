//! # Authgate Core
//!
//! 무상태(stateless) 인증 계층의 핵심 타입과 로직을 제공합니다.
//!
//! 이 크레이트는 HTTP 프레임워크에 의존하지 않습니다:
//! - 토큰 발급/디코딩 ([`TokenCodec`])과 만료 검증 ([`TokenValidator`])
//! - 프로세스 전역 서명 키 ([`SigningKey`])
//! - 로그인 시점의 비밀번호 검증 ([`CredentialVerifier`])
//! - 사용자 저장소 경계 ([`UserStore`])와 사용자 서비스 ([`UserService`])
//! - 설정 관리 및 로깅 인프라

pub mod config;
pub mod credential;
pub mod error;
pub mod logging;
pub mod token;
pub mod user;

pub use config::{AppConfig, DatabaseConfig, JwtConfig, LoggingConfig, ServerConfig};
pub use credential::{validate_password_strength, Argon2Verifier, CredentialVerifier, PasswordError};
pub use error::ConfigurationError;
pub use logging::{init_logging, LogConfig, LogFormat};
pub use token::{
    Claims, Identity, SigningKey, TokenCodec, TokenError, TokenLifetimes, TokenPair,
    TokenValidator,
};
pub use user::{
    InMemoryUserStore, NewUser, ProfileUpdate, StoreError, User, UserDraft, UserService,
    UserServiceError, UserStatus, UserStore,
};
