//! 프로세스 전역 HMAC 서명 키.

use std::fmt;
use std::sync::Arc;

use base64::Engine;
use jsonwebtoken::{DecodingKey, EncodingKey};
use secrecy::{ExposeSecret, SecretString};

use crate::error::ConfigurationError;

/// HS256 키 최소 길이 (바이트).
pub const MIN_SECRET_BYTES: usize = 32;

/// HMAC 서명 키.
///
/// 시작 시 한 번 생성되고 이후에는 읽기 전용입니다. 복제는 `Arc` 복제이므로
/// 요청마다 잠금 없이 공유할 수 있습니다. 키를 바꾸면 기존 토큰은 모두 무효가 됩니다.
#[derive(Clone)]
pub struct SigningKey {
    material: Arc<KeyMaterial>,
}

struct KeyMaterial {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    /// base64 비밀 문자열에서 키 생성.
    pub fn from_base64_secret(secret: &SecretString) -> Result<Self, ConfigurationError> {
        let encoded = secret.expose_secret().trim();
        if encoded.is_empty() {
            return Err(ConfigurationError::MissingSecret);
        }

        let bytes = base64::engine::general_purpose::STANDARD.decode(encoded)?;
        Self::from_bytes(&bytes)
    }

    /// 원시 바이트에서 키 생성.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigurationError> {
        if bytes.len() < MIN_SECRET_BYTES {
            return Err(ConfigurationError::WeakSecret {
                min: MIN_SECRET_BYTES,
                actual: bytes.len(),
            });
        }

        Ok(Self {
            material: Arc::new(KeyMaterial {
                encoding: EncodingKey::from_secret(bytes),
                decoding: DecodingKey::from_secret(bytes),
            }),
        })
    }

    pub(crate) fn encoding(&self) -> &EncodingKey {
        &self.material.encoding
    }

    pub(crate) fn decoding(&self) -> &DecodingKey {
        &self.material.decoding
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey([REDACTED])")
    }
}
