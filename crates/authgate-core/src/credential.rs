//! 비밀번호 해싱 및 검증.
//!
//! 로그인 시점에만 사용되며 토큰 검증 경로와는 무관합니다.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password hashing failed")]
    HashingFailed,
    #[error("stored password hash is not in PHC format")]
    InvalidHashFormat,
}

/// 자격 증명 검증기.
///
/// 저장소에는 해시만 저장되며 평문 비밀번호는 어디에도 남지 않습니다.
pub trait CredentialVerifier: Send + Sync {
    /// 평문 비밀번호를 저장용 해시로 변환.
    fn hash(&self, password: &str) -> Result<String, PasswordError>;

    /// 평문 비밀번호가 저장된 해시와 일치하는지 확인.
    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError>;
}

/// Argon2id 기반 검증기.
///
/// 기본 파라미터 (m=19456, t=2, p=1)를 사용합니다.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Verifier;

impl Argon2Verifier {
    pub fn new() -> Self {
        Self
    }
}

impl CredentialVerifier for Argon2Verifier {
    /// 솔트는 자동으로 생성되며 PHC 문자열에 포함됩니다.
    ///
    /// ```rust,ignore
    /// let hash = Argon2Verifier::new().hash("my_secure_password1")?;
    /// // "$argon2id$v=19$m=19456,t=2,p=1$..."
    /// ```
    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|_| PasswordError::HashingFailed)?;

        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(stored_hash).map_err(|_| PasswordError::InvalidHashFormat)?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

/// 비밀번호 강도 검증.
///
/// - 최소 8자 이상
/// - 최소 1개의 숫자 포함
/// - 최소 1개의 영문자 포함
pub fn validate_password_strength(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < 8 {
        return Err("password must be at least 8 characters long");
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("password must contain at least one digit");
    }

    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err("password must contain at least one letter");
    }

    Ok(())
}
