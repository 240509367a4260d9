//! 인증 및 권한 부여.
//!
//! 토큰 기반 인증과 역할 기반 접근 제어를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`TokenCodec`]: 서명된 세션 토큰 발급/검증
//! - [`AuthGate`]: 최소 역할을 강제하는 미들웨어
//! - [`AuthUser`]: 검증된 신원을 읽는 추출기
//! - 비밀번호 해싱/비교 함수
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn protected_handler(AuthUser(payload): AuthUser) -> impl IntoResponse {
//!     format!("Hello, {}!", payload.sub)
//! }
//! ```

mod middleware;
mod password;
mod token;

pub use middleware::{auth_gate, AuthGate, AuthUser, GateDecision};
pub use password::{
    compare, compare_blocking, hash_password, hash_password_blocking, PasswordError,
    DECOY_HASH,
};
pub use token::{TokenCodec, TokenError, TokenPayload};
