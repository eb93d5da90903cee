//! Authgate HTTP 서버.
//!
//! - Axum 기반 REST API
//! - 요청 단위 Bearer 토큰 게이트
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`auth`]: 인증 게이트, 요청 컨텍스트, 추출기
//! - [`routes`]: REST API 엔드포인트
//! - [`repository`]: PostgreSQL 사용자 저장소
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod state;

pub use auth::{auth_gate, AuthGate, CurrentUser, GateOutcome, MaybeUser, RequestContext};
pub use error::{ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use routes::{create_api_router, create_app};
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;
