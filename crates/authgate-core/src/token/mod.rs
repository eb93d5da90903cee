//! Bearer 토큰 수명주기.
//!
//! 토큰은 `header.claims.signature` 형식의 HS256 서명 JWT입니다.
//! 서버는 토큰을 저장하지 않으며, 수명은 내장된 `exp`로만 제한됩니다.
//! 만료 전 폐기(revocation)는 구조적으로 불가능합니다.
//!
//! # 구성 요소
//!
//! - [`SigningKey`]: 시작 시 한 번 로드되는 HMAC 키
//! - [`TokenCodec`]: 발급 및 서명 검증을 포함한 디코딩
//! - [`TokenValidator`]: 만료 확인 및 subject 기반 보조 검증
//! - [`Identity`]: 디코딩된 신원 정보

mod claims;
mod codec;
mod key;
mod validator;

pub use claims::{Claims, Identity};
pub use codec::{TokenCodec, TokenError, TokenLifetimes, TokenPair, BEARER_TOKEN_TYPE};
pub use key::{SigningKey, MIN_SECRET_BYTES};
pub use validator::TokenValidator;
