//! 모든 핸들러에서 공유되는 애플리케이션 상태.

use std::sync::Arc;

use authgate_core::{
    Argon2Verifier, InMemoryUserStore, SigningKey, TokenCodec, TokenLifetimes, TokenValidator,
    UserService, UserStore,
};

use crate::auth::AuthGate;

/// 애플리케이션 공유 상태.
///
/// 서명 키는 시작 시 한 번 주입되어 [`TokenCodec`]과 [`AuthGate`]가 함께 공유하며,
/// 이후 변경 경로는 없습니다.
#[derive(Clone)]
pub struct AppState {
    /// 토큰 발급 (로그인)
    pub tokens: TokenCodec,

    /// 요청 단위 인증 게이트
    pub gate: AuthGate,

    /// 가입/로그인/프로필 서비스
    pub users: UserService,

    /// 데이터베이스 연결 풀 (설정된 경우)
    pub db_pool: Option<sqlx::PgPool>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 서명 키, 토큰 수명, 사용자 저장소로 상태를 구성합니다.
    pub fn new(key: SigningKey, lifetimes: TokenLifetimes, store: Arc<dyn UserStore>) -> Self {
        let tokens = TokenCodec::new(key).with_lifetimes(lifetimes);
        let gate = AuthGate::new(TokenValidator::from_codec(tokens.clone()));
        let users = UserService::new(store, Arc::new(Argon2Verifier::new()));

        Self {
            tokens,
            gate,
            users,
            db_pool: None,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 인메모리 저장소를 사용하는 상태.
    pub fn in_memory(key: SigningKey, lifetimes: TokenLifetimes) -> Self {
        Self::new(key, lifetimes, Arc::new(InMemoryUserStore::new()))
    }

    /// 데이터베이스 풀 설정 (헬스 체크용).
    #[must_use]
    pub fn with_db_pool(mut self, pool: sqlx::PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// 서버 업타임 (초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }

    /// 데이터베이스 연결 확인.
    pub async fn is_db_healthy(&self) -> bool {
        match &self.db_pool {
            Some(pool) => sqlx::query("SELECT 1").execute(pool).await.is_ok(),
            None => false,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("tokens", &self.tokens)
            .field("has_db", &self.db_pool.is_some())
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// 테스트용 서명 키 (32바이트).
#[cfg(any(test, feature = "test-utils"))]
pub const TEST_SIGNING_SECRET: &[u8; 32] = b"0123456789abcdef0123456789abcdef";

/// 테스트용 AppState 생성 (인메모리 저장소, 기본 수명).
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    let key = SigningKey::from_bytes(TEST_SIGNING_SECRET)
        .unwrap_or_else(|e| panic!("test signing key rejected: {e}"));
    AppState::in_memory(key, TokenLifetimes::default())
}
