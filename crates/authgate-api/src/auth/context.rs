//! 요청 컨텍스트와 추출기.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header::WWW_AUTHENTICATE, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};

use authgate_core::Identity;

use crate::error::ApiErrorResponse;

/// 인증된 요청의 신원 정보.
///
/// 게이트가 검증에 성공했을 때만 요청 extension에 존재하며, 요청 하나에 한 번만 설정됩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub user_id: i64,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

impl From<Identity> for RequestContext {
    fn from(identity: Identity) -> Self {
        Self {
            user_id: identity.user_id,
            username: identity.subject,
            expires_at: identity.expires_at,
        }
    }
}

/// 신원이 필요한 라우트용 추출기. 신원이 없으면 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub RequestContext);

/// 신원이 선택적인 라우트용 추출기.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<RequestContext>);

/// 인증 필요 응답.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("authentication required")]
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorResponse::new("UNAUTHORIZED", self.to_string()));

        let mut response = (StatusCode::UNAUTHORIZED, body).into_response();
        response
            .headers_mut()
            .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        response
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AuthRejection)
    }
}

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<RequestContext>().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn context() -> RequestContext {
        RequestContext {
            user_id: 42,
            username: "alice".to_string(),
            expires_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_current_user_without_context() {
        let (mut parts, _) = Request::new(()).into_parts();
        let result = CurrentUser::from_request_parts(&mut parts, &()).await;

        let response = result.unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[WWW_AUTHENTICATE], "Bearer");
    }

    #[tokio::test]
    async fn test_current_user_with_context() {
        let (mut parts, _) = Request::new(()).into_parts();
        parts.extensions.insert(context());

        let CurrentUser(ctx) = CurrentUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(ctx.user_id, 42);
        assert_eq!(ctx.username, "alice");
    }

    #[tokio::test]
    async fn test_maybe_user() {
        let (mut parts, _) = Request::new(()).into_parts();
        let MaybeUser(none) = MaybeUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(none.is_none());

        parts.extensions.insert(context());
        let MaybeUser(some) = MaybeUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(some.map(|c| c.user_id), Some(42));
    }
}
