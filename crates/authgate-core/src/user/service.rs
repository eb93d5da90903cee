//! 가입, 로그인, 프로필 관리.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::store::{StoreError, UserStore};
use super::{NewUser, ProfileUpdate, User, UserDraft, UserStatus, DEFAULT_AVATAR, DEFAULT_ROLE};
use crate::credential::{validate_password_strength, CredentialVerifier, PasswordError};

/// 사용자 서비스 에러.
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("username is already taken")]
    UsernameTaken,
    #[error("email is already registered")]
    EmailTaken,
    /// 사용자 없음과 비밀번호 불일치를 구분하지 않습니다.
    #[error("invalid username or password")]
    CredentialMismatch,
    #[error("account is disabled")]
    AccountDisabled,
    #[error("user not found")]
    NotFound,
    #[error("{0}")]
    WeakPassword(&'static str),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for UserServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { field: "username" } => UserServiceError::UsernameTaken,
            StoreError::Conflict { field: "email" } => UserServiceError::EmailTaken,
            other => UserServiceError::Store(other),
        }
    }
}

/// 사용자 서비스.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    credentials: Arc<dyn CredentialVerifier>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, credentials: Arc<dyn CredentialVerifier>) -> Self {
        Self { store, credentials }
    }

    /// 가입.
    ///
    /// 닉네임이 없으면 사용자 이름을, 아바타가 없으면 기본 아바타를 사용합니다.
    pub async fn register(&self, new_user: NewUser) -> Result<User, UserServiceError> {
        validate_password_strength(&new_user.password).map_err(UserServiceError::WeakPassword)?;

        if self.store.find_by_username(&new_user.username).await?.is_some() {
            return Err(UserServiceError::UsernameTaken);
        }
        if self.store.find_by_email(&new_user.email).await?.is_some() {
            return Err(UserServiceError::EmailTaken);
        }

        let password_hash = self.credentials.hash(&new_user.password)?;
        let nickname = new_user
            .nickname
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| new_user.username.clone());
        let avatar = new_user
            .avatar
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_AVATAR.to_string());

        let user = self
            .store
            .insert(UserDraft {
                username: new_user.username,
                email: new_user.email,
                password_hash,
                nickname,
                avatar,
                role: DEFAULT_ROLE.to_string(),
                status: UserStatus::Active,
                created_at: Utc::now(),
            })
            .await?;

        info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// 자격 증명 확인.
    ///
    /// 성공 시 마지막 로그인 시각을 갱신합니다. 토큰 발급은 호출자가 합니다.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, UserServiceError> {
        let Some(mut user) = self.store.find_by_username(username).await? else {
            debug!(username, "Login failed: unknown user");
            return Err(UserServiceError::CredentialMismatch);
        };

        if !self.credentials.verify(password, &user.password_hash)? {
            debug!(user_id = user.id, "Login failed: password mismatch");
            return Err(UserServiceError::CredentialMismatch);
        }

        if !user.is_active() {
            debug!(user_id = user.id, status = %user.status, "Login refused");
            return Err(UserServiceError::AccountDisabled);
        }

        let now = Utc::now();
        self.store.touch_last_login(user.id, now).await?;
        user.last_login_at = Some(now);

        info!(user_id = user.id, "User logged in");
        Ok(user)
    }

    pub async fn get(&self, id: i64) -> Result<User, UserServiceError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(UserServiceError::NotFound)
    }

    pub async fn list(&self) -> Result<Vec<User>, UserServiceError> {
        Ok(self.store.list().await?)
    }

    /// 프로필 수정.
    ///
    /// 사용자 이름과 이메일은 다른 사용자와 겹치지 않아야 합니다.
    pub async fn update_profile(
        &self,
        id: i64,
        update: ProfileUpdate,
    ) -> Result<User, UserServiceError> {
        let mut user = self.get(id).await?;

        if let Some(username) = update.username.filter(|u| *u != user.username) {
            if self.store.find_by_username(&username).await?.is_some() {
                return Err(UserServiceError::UsernameTaken);
            }
            user.username = username;
        }
        if let Some(email) = update.email.filter(|e| *e != user.email) {
            if self.store.find_by_email(&email).await?.is_some() {
                return Err(UserServiceError::EmailTaken);
            }
            user.email = email;
        }
        if let Some(password) = update.password {
            validate_password_strength(&password).map_err(UserServiceError::WeakPassword)?;
            user.password_hash = self.credentials.hash(&password)?;
        }
        if let Some(nickname) = update.nickname {
            user.nickname = nickname;
        }
        if let Some(avatar) = update.avatar {
            user.avatar = avatar;
        }
        user.updated_at = Utc::now();

        let updated = self
            .store
            .update(&user)
            .await?
            .ok_or(UserServiceError::NotFound)?;

        info!(user_id = id, "User profile updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<(), UserServiceError> {
        if !self.store.delete(id).await? {
            return Err(UserServiceError::NotFound);
        }
        info!(user_id = id, "User deleted");
        Ok(())
    }
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish_non_exhaustive()
    }
}
