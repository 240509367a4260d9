//! Horizon Cloud 관리 백엔드 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API (학번 기반 계정 관리)
//! - 서명 토큰 인증과 역할 기반 게이트
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: 기능 모듈과 REST API 엔드포인트
//! - [`auth`]: 토큰 코덱, 비밀번호 해싱, 인증 게이트
//! - [`services`]: 계정 비즈니스 로직
//! - [`repository`]: 자격증명 저장소 구현
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod auth;
pub mod error;
pub mod extract;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;

pub use auth::{
    auth_gate, compare, hash_password, AuthGate, AuthUser, GateDecision, PasswordError,
    TokenCodec, TokenError, TokenPayload,
};
pub use error::{AccountError, ApiErrorResponse, ApiResult};
pub use extract::ValidatedJson;
pub use metrics::setup_metrics_recorder;
pub use middleware::{access_label, metrics_layer};
pub use repository::{MemoryUserStore, PgUserRepository};
pub use routes::{create_api_router, create_app_router, modules, Module};
pub use services::{AccountService, LoginResponse, RegisterResponse};
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::{create_test_state, TEST_JWT_SECRET};
