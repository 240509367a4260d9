//! REST API 라우트.
//!
//! 기능 단위의 모듈([`Module`])이 각자 라우터를 제공하고,
//! 등록된 모듈은 설정된 접두사(`/{prefix}`) 아래에 마운트됩니다.
//!
//! # 엔드포인트
//!
//! - `POST /{prefix}/user/login`
//! - `POST /{prefix}/user/register`
//! - `POST /{prefix}/user/change-password` (Member 이상)
//! - `GET  /{prefix}/user/me` (Member 이상)
//! - `GET  /{prefix}/ping`
//! - `GET  /health`, `GET /health/ready`

pub mod health;
pub mod ping;
pub mod user;

use std::sync::Arc;

use axum::{middleware, Router};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use health::{
    health_router, ComponentState, Readiness, ReadinessResponse, StoreHealth, TokenSettings,
};
pub use ping::PingModule;
pub use user::{
    user_router, ChangePasswordRequest, LoginRequest, MeResponse, RegisterRequest,
    SuccessResponse, UserModule,
};

use crate::middleware::metrics_layer;
use crate::openapi::swagger_ui_router;
use crate::state::AppState;

/// 전역 요청 타임아웃.
pub const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// 기능 모듈.
///
/// 새 모듈은 이 trait을 구현하고 [`modules`]에 등록합니다.
pub trait Module: Send + Sync {
    /// 모듈 이름 (로깅용).
    fn name(&self) -> &'static str;

    /// 모듈 라우터. 접두사 없이 모듈 기준 경로로 정의합니다.
    fn router(&self, state: &AppState) -> Router<Arc<AppState>>;
}

/// 등록된 모듈 목록.
pub fn modules() -> Vec<Box<dyn Module>> {
    vec![Box::new(UserModule), Box::new(PingModule)]
}

/// API 라우터 생성.
///
/// `prefix`는 `/api` 형태로 정규화된 값이어야 하며, 빈 문자열이면 루트에 마운트합니다.
pub fn create_api_router(state: &AppState, prefix: &str) -> Router<Arc<AppState>> {
    let mut api = Router::new();
    for module in modules() {
        tracing::info!(module = module.name(), prefix, "모듈 라우터 등록");
        api = api.merge(module.router(state));
    }

    let api = if prefix.is_empty() {
        api
    } else {
        Router::new().nest(prefix, api)
    };

    api.nest("/health", health_router())
}

/// 전체 애플리케이션 라우터 생성.
///
/// API 라우터에 Swagger UI와 공통 미들웨어(메트릭, 트레이싱, 타임아웃, CORS)를 적용합니다.
/// `/metrics`는 별도 상태가 필요하므로 바이너리에서 병합합니다.
pub fn create_app_router(state: Arc<AppState>, prefix: &str, cors: CorsLayer) -> Router {
    let api_router = create_api_router(&state, prefix).with_state(state);

    Router::new()
        .merge(api_router)
        .merge(swagger_ui_router(prefix))
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        // 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .layer(cors)
}
