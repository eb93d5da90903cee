//! 인증 게이트 통합 테스트
//!
//! 게이트는 어떤 토큰이 와도 요청을 거절하지 않고 다음 단계로 정확히 한 번 넘긴다.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::Request,
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use base64::Engine;
use chrono::{Duration, Utc};
use tower::ServiceExt;

use authgate_api::{auth_gate, AuthGate, MaybeUser, RequestContext};
use authgate_core::{SigningKey, TokenCodec, TokenValidator};

const SECRET: &[u8; 32] = b"0123456789abcdef0123456789abcdef";

fn codec() -> TokenCodec {
    TokenCodec::new(SigningKey::from_bytes(SECRET).unwrap())
}

/// 게이트 뒤에 신원을 그대로 돌려주는 핸들러를 둔 라우터.
fn probe_app(hits: Arc<AtomicUsize>) -> Router {
    let gate = AuthGate::new(TokenValidator::from_codec(codec()));

    Router::new()
        .route(
            "/whoami",
            get(move |MaybeUser(ctx): MaybeUser| {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    match ctx {
                        Some(ctx) => format!("{}:{}", ctx.username, ctx.user_id),
                        None => "anonymous".to_string(),
                    }
                }
            }),
        )
        .layer(middleware::from_fn_with_state(gate, auth_gate))
}

async fn call(app: Router, authorization: Option<&str>) -> (StatusCode, String) {
    let mut builder = Request::builder().uri("/whoami");
    if let Some(value) = authorization {
        builder = builder.header(AUTHORIZATION, value);
    }

    let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_no_header_forwards_anonymous() {
    let hits = Arc::new(AtomicUsize::new(0));
    let (status, body) = call(probe_app(hits.clone()), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "anonymous");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_valid_token_attaches_identity() {
    let hits = Arc::new(AtomicUsize::new(0));
    let token = codec().issue("alice", 42, Duration::hours(1)).unwrap();

    let (status, body) = call(probe_app(hits.clone()), Some(&format!("Bearer {token}"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "alice:42");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_expired_token_forwards_anonymous() {
    let hits = Arc::new(AtomicUsize::new(0));
    let token = codec()
        .issue_at("alice", 42, Duration::seconds(3600), Utc::now() - Duration::seconds(3601))
        .unwrap();

    let (status, body) = call(probe_app(hits.clone()), Some(&format!("Bearer {token}"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "anonymous");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_bad_tokens_forward_anonymous() {
    let other_key = TokenCodec::new(SigningKey::from_bytes(b"another-32-byte-secret-for-tests").unwrap());
    let foreign = other_key.issue("alice", 42, Duration::hours(1)).unwrap();

    let header = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#);
    let claims = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .encode(r#"{"sub":"mallory","jti":"1","userId":1,"iat":0,"exp":9999999999}"#);
    let unsigned = format!("{header}.{claims}.");

    let no_user_id = jsonwebtoken::encode(
        &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
        &serde_json::json!({
            "sub": "alice",
            "jti": "42",
            "iat": Utc::now().timestamp(),
            "exp": (Utc::now() + Duration::hours(1)).timestamp(),
        }),
        &jsonwebtoken::EncodingKey::from_secret(SECRET),
    )
    .unwrap();

    let cases = [
        "Bearer ".to_string(),
        "Bearer invalid.token".to_string(),
        "Bearer a.b.c.d".to_string(),
        format!("Bearer {foreign}"),
        format!("Bearer {unsigned}"),
        format!("Bearer {no_user_id}"),
        "Basic YWxpY2U6c2VjcmV0".to_string(),
    ];

    for value in cases {
        let hits = Arc::new(AtomicUsize::new(0));
        let (status, body) = call(probe_app(hits.clone()), Some(&value)).await;

        assert_eq!(status, StatusCode::OK, "case {value:?}");
        assert_eq!(body, "anonymous", "case {value:?}");
        assert_eq!(hits.load(Ordering::SeqCst), 1, "case {value:?}");
    }
}

#[tokio::test]
async fn test_existing_context_is_not_replaced() {
    async fn preset(mut request: Request, next: Next) -> Response {
        request.extensions_mut().insert(RequestContext {
            user_id: 7,
            username: "preset".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        });
        next.run(request).await
    }

    let hits = Arc::new(AtomicUsize::new(0));
    let app = probe_app(hits.clone()).layer(middleware::from_fn(preset));
    let token = codec().issue("alice", 42, Duration::hours(1)).unwrap();

    let (_, body) = call(app, Some(&format!("Bearer {token}"))).await;

    assert_eq!(body, "preset:7");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_requests_keep_identities_apart() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = probe_app(hits.clone());
    let codec = codec();

    let tasks: Vec<_> = (1..=20i64)
        .map(|id| {
            let app = app.clone();
            let token = codec.issue(&format!("user{id}"), id, Duration::hours(1)).unwrap();
            tokio::spawn(async move { (id, call(app, Some(&format!("Bearer {token}"))).await) })
        })
        .collect();

    for task in tasks {
        let (id, (status, body)) = task.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, format!("user{id}:{id}"));
    }
    assert_eq!(hits.load(Ordering::SeqCst), 20);
}
