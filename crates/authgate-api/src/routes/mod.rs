//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/user` - 가입, 로그인, 프로필 관리

pub mod health;
pub mod users;

pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use users::{
    users_router, LoginRequest, LoginResponse, RegisterRequest, UpdateProfileRequest,
    UserListResponse, UserResponse,
};

use std::sync::Arc;

use axum::{middleware, Router};

use crate::auth::auth_gate;
use crate::state::AppState;

/// 전체 API 라우터 생성 (상태 미적용).
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/api/user", users_router())
}

/// 인증 게이트가 적용된 애플리케이션 라우터.
///
/// 게이트는 모든 라우트 앞에서 실행되며 요청을 거절하지 않습니다.
pub fn create_app(state: Arc<AppState>) -> Router {
    let gate = state.gate.clone();

    create_api_router()
        .layer(middleware::from_fn_with_state(gate, auth_gate))
        .with_state(state)
}
