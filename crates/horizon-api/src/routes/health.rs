//! 헬스 체크 endpoint.
//!
//! - `GET /health`: 프로세스 생존 여부만 응답합니다.
//! - `GET /health/ready`: 자격증명 저장소에 실제 조회를 보내 로그인 경로가
//!   동작하는지 확인합니다. 저장소가 응답하지 않으면 503입니다.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// 저장소 조회 제한 시간.
const STORE_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// 서비스 전체 준비 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    /// 로그인과 가입 처리 가능
    Ready,
    /// 처리 가능하지만 보조 구성요소(캐시) 장애
    Degraded,
    /// 자격증명 저장소 장애로 계정 요청 처리 불가
    Unavailable,
}

/// 구성요소 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ComponentState {
    Up,
    Down,
    NotConfigured,
}

/// 자격증명 저장소 상태.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StoreHealth {
    /// 저장소 구현 ("postgres" | "memory")
    pub backend: String,

    pub state: ComponentState,

    /// 조회 응답 시간(ms). 실패하면 없음.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,

    /// 실패 사유
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 토큰 발급 설정 요약.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenSettings {
    /// 토큰을 싣는 요청 헤더
    pub header: String,

    /// 발급 토큰 수명(초)
    pub ttl_secs: u64,
}

/// `GET /health/ready` 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadinessResponse {
    pub status: Readiness,

    /// API 버전
    pub version: String,

    /// 서버 업타임(초)
    pub uptime_secs: i64,

    /// 현재 시간 (RFC 3339)
    pub timestamp: String,

    pub credential_store: StoreHealth,

    /// Redis 캐시 상태
    pub cache: ComponentState,

    pub token: TokenSettings,
}

/// GET /health - 생존 확인
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "서버 응답 가능", body = String))
)]
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /health/ready - 계정 요청 처리 가능 여부
///
/// 저장소 조회가 실패하면 503, Redis만 실패하면 200에 `degraded`입니다.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "system",
    responses(
        (status = 200, description = "준비 완료 또는 캐시만 장애", body = ReadinessResponse),
        (status = 503, description = "자격증명 저장소 장애", body = ReadinessResponse)
    )
)]
pub async fn health_ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let backend = state.store.store_name();
    let credential_store = match state.check_store(STORE_CHECK_TIMEOUT).await {
        Ok(elapsed) => StoreHealth {
            backend: backend.to_string(),
            state: ComponentState::Up,
            latency_ms: Some(elapsed.as_millis() as u64),
            error: None,
        },
        Err(e) => {
            tracing::warn!(store = backend, error = %e, "readiness: 저장소 조회 실패");
            StoreHealth {
                backend: backend.to_string(),
                state: ComponentState::Down,
                latency_ms: None,
                error: Some(e.to_string()),
            }
        }
    };

    let cache = match &state.redis {
        None => ComponentState::NotConfigured,
        Some(_) if state.is_redis_healthy().await => ComponentState::Up,
        Some(_) => ComponentState::Down,
    };

    let status = readiness(credential_store.state, cache);
    let status_code = match status {
        Readiness::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        Readiness::Ready | Readiness::Degraded => StatusCode::OK,
    };

    let response = ReadinessResponse {
        status,
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        credential_store,
        cache,
        token: TokenSettings {
            header: state.token_header.to_string(),
            ttl_secs: state.codec.ttl().as_secs(),
        },
    };

    (status_code, Json(response))
}

fn readiness(store: ComponentState, cache: ComponentState) -> Readiness {
    match (store, cache) {
        (ComponentState::Up, ComponentState::Down) => Readiness::Degraded,
        (ComponentState::Up, _) => Readiness::Ready,
        _ => Readiness::Unavailable,
    }
}

/// 헬스 체크 라우터 생성.
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(health_ready))
}
