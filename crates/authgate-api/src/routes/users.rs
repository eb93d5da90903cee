//! 사용자 endpoint.
//!
//! 가입과 로그인은 공개이며, 현재 사용자 조회/수정/삭제는 [`CurrentUser`]로 신원을 요구합니다.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;
use validator::Validate;

use authgate_core::{NewUser, ProfileUpdate, User, UserServiceError};

use crate::auth::{CurrentUser, MaybeUser};
use crate::error::{service_error, token_error, validation_error, ApiErrorResponse, ApiResult};
use crate::metrics::record_login_attempt;
use crate::state::AppState;

// ==================== 요청/응답 타입 ====================

/// 가입 요청.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    pub username: String,
    #[validate(email(message = "email is not a valid address"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters long"))]
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub nickname: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl From<RegisterRequest> for NewUser {
    fn from(req: RegisterRequest) -> Self {
        NewUser {
            username: req.username,
            email: req.email,
            password: req.password,
            nickname: req.nickname,
            avatar: req.avatar,
        }
    }
}

/// 로그인 요청.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// 프로필 수정 요청. 생략한 필드는 변경하지 않습니다.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    pub username: Option<String>,
    #[serde(default)]
    #[validate(email(message = "email is not a valid address"))]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub nickname: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        ProfileUpdate {
            username: req.username,
            email: req.email,
            password: req.password,
            nickname: req.nickname,
            avatar: req.avatar,
        }
    }
}

/// 사용자 정보 (비밀번호 해시 제외).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub nickname: String,
    pub avatar: String,
    pub role: String,
    /// "active" | "inactive"
    pub status: String,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            nickname: user.nickname,
            avatar: user.avatar,
            role: user.role,
            status: user.status.to_string(),
            last_login_at: user.last_login_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// 로그인 응답.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access Token 만료까지 남은 시간 (초)
    pub expires_in: i64,
    /// 항상 "Bearer"
    pub token_type: String,
    pub user: UserResponse,
}

/// 사용자 목록 응답.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub total: usize,
}

// ==================== 핸들러 ====================

/// 가입
#[utoipa::path(
    post,
    path = "/api/user/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "가입 성공", body = UserResponse),
        (status = 400, description = "입력 검증 실패", body = ApiErrorResponse),
        (status = 409, description = "사용자 이름 또는 이메일 중복", body = ApiErrorResponse)
    ),
    tag = "users"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    request.validate().map_err(validation_error)?;

    let user = state
        .users
        .register(request.into())
        .await
        .map_err(service_error)?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// 로그인
#[utoipa::path(
    post,
    path = "/api/user/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "로그인 성공", body = LoginResponse),
        (status = 401, description = "사용자 이름 또는 비밀번호 불일치", body = ApiErrorResponse),
        (status = 403, description = "비활성 계정", body = ApiErrorResponse)
    ),
    tag = "users"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    request.validate().map_err(validation_error)?;

    let user = match state.users.login(&request.username, &request.password).await {
        Ok(user) => user,
        Err(err) => {
            record_login_attempt(match err {
                UserServiceError::CredentialMismatch => "invalid_credentials",
                UserServiceError::AccountDisabled => "disabled",
                _ => "error",
            });
            return Err(service_error(err));
        }
    };

    let pair = state
        .tokens
        .issue_pair(&user.username, user.id)
        .map_err(token_error)?;
    record_login_attempt("success");

    Ok(Json(LoginResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        expires_in: pair.expires_in,
        token_type: pair.token_type,
        user: user.into(),
    }))
}

/// ID로 사용자 조회
#[utoipa::path(
    get,
    path = "/api/user/info/{id}",
    params(("id" = i64, Path, description = "사용자 ID")),
    responses(
        (status = 200, description = "사용자 정보", body = UserResponse),
        (status = 404, description = "사용자 없음", body = ApiErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.users.get(id).await.map_err(service_error)?;
    Ok(Json(user.into()))
}

/// 현재 사용자 조회
#[utoipa::path(
    get,
    path = "/api/user/current",
    responses(
        (status = 200, description = "현재 사용자 정보", body = UserResponse),
        (status = 401, description = "인증 필요", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn current_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(ctx): CurrentUser,
) -> ApiResult<Json<UserResponse>> {
    let user = state.users.get(ctx.user_id).await.map_err(service_error)?;
    Ok(Json(user.into()))
}

/// 현재 사용자 프로필 수정
#[utoipa::path(
    put,
    path = "/api/user/update",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "수정된 사용자 정보", body = UserResponse),
        (status = 400, description = "입력 검증 실패", body = ApiErrorResponse),
        (status = 401, description = "인증 필요", body = ApiErrorResponse),
        (status = 409, description = "사용자 이름 또는 이메일 중복", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(ctx): CurrentUser,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserResponse>> {
    request.validate().map_err(validation_error)?;

    let user = state
        .users
        .update_profile(ctx.user_id, request.into())
        .await
        .map_err(service_error)?;

    Ok(Json(user.into()))
}

/// 사용자 목록
#[utoipa::path(
    get,
    path = "/api/user/list",
    responses(
        (status = 200, description = "사용자 목록", body = UserListResponse)
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    MaybeUser(requester): MaybeUser,
) -> ApiResult<Json<UserListResponse>> {
    debug!(
        requester = requester.as_ref().map(|ctx| ctx.user_id),
        "Listing users"
    );

    let users: Vec<UserResponse> = state
        .users
        .list()
        .await
        .map_err(service_error)?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(UserListResponse {
        total: users.len(),
        users,
    }))
}

/// 사용자 삭제
#[utoipa::path(
    delete,
    path = "/api/user/{id}",
    params(("id" = i64, Path, description = "사용자 ID")),
    responses(
        (status = 204, description = "삭제 완료"),
        (status = 401, description = "인증 필요", body = ApiErrorResponse),
        (status = 404, description = "사용자 없음", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.users.delete(id).await.map_err(service_error)?;
    debug!(user_id = id, deleted_by = ctx.user_id, "User removed via API");
    Ok(StatusCode::NO_CONTENT)
}

/// 사용자 라우터 생성.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/info/{id}", get(get_user))
        .route("/current", get(current_user))
        .route("/update", put(update_profile))
        .route("/list", get(list_users))
        .route("/{id}", delete(delete_user))
}
