//! 사용자 도메인.
//!
//! 토큰이 가리키는 계정 레코드와 그 저장소, 그리고 가입/로그인을 처리하는
//! 서비스를 정의합니다. 토큰 검증 경로는 이 모듈을 참조하지 않습니다.

mod service;
mod store;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use service::{UserService, UserServiceError};
pub use store::{InMemoryUserStore, StoreError, UserStore};

/// 신규 가입 시 기본 아바타 경로.
pub const DEFAULT_AVATAR: &str = "/default-avatar.png";

/// 신규 가입 시 기본 역할.
pub const DEFAULT_ROLE: &str = "user";

/// 계정 상태.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            other => Err(format!("Unknown user status: {}", other)),
        }
    }
}

/// 사용자 계정.
///
/// `password_hash`는 직렬화되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub nickname: String,
    pub avatar: String,
    pub role: String,
    pub status: UserStatus,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// 가입 요청.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// 저장소에 삽입할 레코드. ID는 저장소가 부여합니다.
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub nickname: String,
    pub avatar: String,
    pub role: String,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl UserDraft {
    /// ID를 부여하여 레코드로 변환.
    pub fn into_user(self, id: i64) -> User {
        User {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            nickname: self.nickname,
            avatar: self.avatar,
            role: self.role,
            status: self.status,
            last_login_at: None,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// 프로필 수정 요청. `None` 필드는 변경하지 않습니다.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        assert_eq!("active".parse::<UserStatus>().unwrap(), UserStatus::Active);
        assert_eq!(UserStatus::Inactive.to_string(), "inactive");
        assert!("banned".parse::<UserStatus>().is_err());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = UserDraft {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            nickname: "alice".to_string(),
            avatar: DEFAULT_AVATAR.to_string(),
            role: DEFAULT_ROLE.to_string(),
            status: UserStatus::Active,
            created_at: Utc::now(),
        }
        .into_user(1);

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["status"], "active");
        assert_eq!(json["username"], "alice");
    }
}
