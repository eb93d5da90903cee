//! 사용자 저장소 경계.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{User, UserDraft};

/// 저장소 에러.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 고유 제약 위반 (`username` 또는 `email`)
    #[error("{field} already exists")]
    Conflict { field: &'static str },
    /// 백엔드 에러
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// 사용자 저장소.
///
/// 구현체는 `username`과 `email`의 고유성을 보장해야 합니다.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// ID 오름차순 전체 목록.
    async fn list(&self) -> Result<Vec<User>, StoreError>;

    async fn insert(&self, draft: UserDraft) -> Result<User, StoreError>;

    /// 프로필 필드를 교체합니다. 없는 ID면 `Ok(None)`.
    ///
    /// `created_at`과 `last_login_at`은 저장된 값을 유지합니다.
    async fn update(&self, user: &User) -> Result<Option<User>, StoreError>;

    /// 삭제 여부 반환.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;

    async fn touch_last_login(&self, id: i64, at: DateTime<Utc>) -> Result<(), StoreError>;
}

/// 인메모리 저장소.
///
/// 데이터베이스가 설정되지 않았을 때와 테스트에서 사용합니다.
/// ID는 1부터 순차 부여되며 삭제된 ID는 재사용하지 않습니다.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    users: BTreeMap<i64, User>,
}

impl Inner {
    fn conflict(&self, username: &str, email: &str, except: Option<i64>) -> Option<&'static str> {
        let others = self.users.values().filter(|u| Some(u.id) != except);
        for user in others {
            if user.username == username {
                return Some("username");
            }
            if user.email == email {
                return Some("email");
            }
        }
        None
    }
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.inner.read().await.users.values().cloned().collect())
    }

    async fn insert(&self, draft: UserDraft) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(field) = inner.conflict(&draft.username, &draft.email, None) {
            return Err(StoreError::Conflict { field });
        }

        inner.next_id += 1;
        let user = draft.into_user(inner.next_id);
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<Option<User>, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&user.id) {
            return Ok(None);
        }
        if let Some(field) = inner.conflict(&user.username, &user.email, Some(user.id)) {
            return Err(StoreError::Conflict { field });
        }
        let Some(stored) = inner.users.get_mut(&user.id) else {
            return Ok(None);
        };

        let updated = User {
            created_at: stored.created_at,
            last_login_at: stored.last_login_at,
            ..user.clone()
        };
        *stored = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.users.remove(&id).is_some())
    }

    async fn touch_last_login(&self, id: i64, at: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(user) = self.inner.write().await.users.get_mut(&id) {
            user.last_login_at = Some(at);
        }
        Ok(())
    }
}
