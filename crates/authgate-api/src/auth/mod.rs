//! 요청 단위 인증.
//!
//! [`auth_gate`]는 모든 요청 앞에서 한 번 실행되어 Bearer 토큰을 검증하고,
//! 성공하면 [`RequestContext`]를 요청 extension에 붙입니다. 실패해도 요청을
//! 거절하지 않으며, 신원이 필요한 핸들러가 [`CurrentUser`] 추출기로 401을 결정합니다.
//!
//! ```rust,ignore
//! async fn protected_handler(CurrentUser(ctx): CurrentUser) -> impl IntoResponse {
//!     format!("Hello, {}!", ctx.username)
//! }
//! ```

mod context;
mod gate;

pub use context::{AuthRejection, CurrentUser, MaybeUser, RequestContext};
pub use gate::{auth_gate, bearer_token, AuthGate, GateOutcome, BEARER_PREFIX};
