//! 통합 API 에러 응답 타입.
//!
//! 모든 엔드포인트에서 일관된 에러 형식을 제공합니다.

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;
use utoipa::ToSchema;
use validator::ValidationErrors;

use authgate_core::{TokenError, UserServiceError};

/// 통합 API 에러 응답.
///
/// ```json
/// {
///   "code": "USER_NOT_FOUND",
///   "message": "user not found",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "INVALID_CREDENTIALS", "USER_NOT_FOUND")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 에러 상세 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::new(code, message)
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// 핸들러 에러 타입.
pub type ApiError = (StatusCode, Json<ApiErrorResponse>);

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;

/// 에러 응답 생성 헬퍼.
pub fn api_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
    (status, Json(ApiErrorResponse::new(code, message)))
}

/// 사용자 서비스 에러를 HTTP 응답으로 변환.
///
/// 내부 에러는 로그에만 남기고 응답 메시지는 일반화합니다.
pub fn service_error(err: UserServiceError) -> ApiError {
    let (status, code) = match &err {
        UserServiceError::UsernameTaken => (StatusCode::CONFLICT, "USERNAME_TAKEN"),
        UserServiceError::EmailTaken => (StatusCode::CONFLICT, "EMAIL_TAKEN"),
        UserServiceError::CredentialMismatch => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
        UserServiceError::AccountDisabled => (StatusCode::FORBIDDEN, "ACCOUNT_DISABLED"),
        UserServiceError::NotFound => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
        UserServiceError::WeakPassword(_) => (StatusCode::BAD_REQUEST, "WEAK_PASSWORD"),
        UserServiceError::Password(_) | UserServiceError::Store(_) => {
            error!(error = %err, "User service failure");
            return api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "internal server error",
            );
        }
    };

    api_error(status, code, err.to_string())
}

/// 토큰 발급 실패를 HTTP 응답으로 변환.
pub fn token_error(err: TokenError) -> ApiError {
    error!(error = %err, "Token issue failed");
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "TOKEN_ISSUE_FAILED",
        "failed to issue token",
    )
}

/// 입력 검증 실패를 400 응답으로 변환.
pub fn validation_error(errors: ValidationErrors) -> ApiError {
    let fields: serde_json::Map<String, Value> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let messages: Vec<Value> = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| Value::String(m.to_string()))
                        .unwrap_or_else(|| Value::String(e.code.to_string()))
                })
                .collect();
            (field.to_string(), Value::Array(messages))
        })
        .collect();

    (
        StatusCode::BAD_REQUEST,
        Json(ApiErrorResponse::with_details(
            "VALIDATION_ERROR",
            "request validation failed",
            Value::Object(fields),
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use authgate_core::StoreError;

    #[test]
    fn test_api_error_response_new() {
        let error = ApiErrorResponse::new("TEST_ERROR", "Test message");
        assert_eq!(error.code, "TEST_ERROR");
        assert!(error.timestamp.is_some());
        assert!(error.details.is_none());

        let json = serde_json::to_string(&error).unwrap();
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_service_error_status_codes() {
        let cases = [
            (UserServiceError::UsernameTaken, StatusCode::CONFLICT),
            (UserServiceError::EmailTaken, StatusCode::CONFLICT),
            (UserServiceError::CredentialMismatch, StatusCode::UNAUTHORIZED),
            (UserServiceError::AccountDisabled, StatusCode::FORBIDDEN),
            (UserServiceError::NotFound, StatusCode::NOT_FOUND),
            (UserServiceError::WeakPassword("too short"), StatusCode::BAD_REQUEST),
        ];

        for (err, expected) in cases {
            let (status, _) = service_error(err);
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn test_internal_errors_are_generic() {
        let (status, Json(body)) = service_error(UserServiceError::Store(StoreError::Backend(
            "connection refused at 10.0.0.5".to_string(),
        )));

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, "INTERNAL_ERROR");
        assert!(!body.message.contains("10.0.0.5"));
    }
}
