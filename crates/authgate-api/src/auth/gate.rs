//! Bearer 토큰 게이트 미들웨어.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use tracing::debug;

use authgate_core::{Identity, TokenError, TokenValidator};

use super::context::RequestContext;
use crate::metrics::record_gate_decision;

/// `Authorization` 헤더의 스킴 접두사 (대소문자 구분).
pub const BEARER_PREFIX: &str = "Bearer ";

/// 게이트 판정 결과.
#[derive(Debug)]
pub enum GateOutcome {
    /// 헤더 없음 또는 Bearer 스킴이 아님
    NoCredentials,
    /// 토큰이 있었지만 사용할 수 없음. 사유는 로그에만 남습니다
    Rejected(TokenError),
    /// 서명과 만료 검증 통과
    Authenticated(Identity),
}

impl GateOutcome {
    /// `auth_gate_decisions_total`의 `outcome` 라벨.
    pub fn label(&self) -> &'static str {
        match self {
            GateOutcome::NoCredentials => "anonymous",
            GateOutcome::Rejected(err) => err.reason(),
            GateOutcome::Authenticated(_) => "authenticated",
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            GateOutcome::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }
}

/// 요청 단위 인증 게이트.
///
/// 공유 상태는 읽기 전용 [`TokenValidator`]뿐이므로 잠금 없이 동시에 실행됩니다.
#[derive(Debug, Clone)]
pub struct AuthGate {
    validator: TokenValidator,
}

impl AuthGate {
    pub fn new(validator: TokenValidator) -> Self {
        Self { validator }
    }

    /// 요청 헤더를 판정합니다.
    pub fn evaluate(&self, headers: &HeaderMap) -> GateOutcome {
        self.evaluate_at(headers, Utc::now())
    }

    pub fn evaluate_at(&self, headers: &HeaderMap, now: DateTime<Utc>) -> GateOutcome {
        let Some(token) = bearer_token(headers) else {
            return GateOutcome::NoCredentials;
        };

        let identity = match self.validator.codec().decode(token) {
            Ok(identity) => identity,
            Err(err) => return GateOutcome::Rejected(err),
        };

        if self.validator.check_expiry_at(&identity, now) {
            return GateOutcome::Rejected(TokenError::Expired);
        }
        GateOutcome::Authenticated(identity)
    }
}

/// `Authorization: Bearer <token>`에서 토큰 부분 추출.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
}

/// 인증 게이트 미들웨어.
///
/// 어떤 경로에서도 요청을 거절하지 않으며 `next`를 정확히 한 번 호출합니다.
/// 검증에 성공하면 [`RequestContext`]를 붙이되, 이미 있으면 덮어쓰지 않습니다.
///
/// ```rust,ignore
/// let app = Router::new()
///     .merge(routes)
///     .layer(middleware::from_fn_with_state(gate, auth_gate));
/// ```
pub async fn auth_gate(State(gate): State<AuthGate>, mut request: Request, next: Next) -> Response {
    let outcome = gate.evaluate(request.headers());
    record_gate_decision(outcome.label());

    match outcome {
        GateOutcome::Authenticated(identity) => {
            if request.extensions().get::<RequestContext>().is_none() {
                request
                    .extensions_mut()
                    .insert(RequestContext::from(identity));
            }
        }
        GateOutcome::Rejected(err) => {
            debug!(
                reason = err.reason(),
                method = %request.method(),
                path = request.uri().path(),
                "Bearer token ignored, continuing unauthenticated"
            );
        }
        GateOutcome::NoCredentials => {}
    }

    next.run(request).await
}
