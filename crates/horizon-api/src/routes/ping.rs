//! Ping 모듈.

use std::sync::Arc;

use axum::{routing::get, Router};

use super::Module;
use crate::state::AppState;

/// GET /api/ping - 연결 확인
#[utoipa::path(
    get,
    path = "/api/ping",
    tag = "system",
    responses((status = 200, description = "pong", body = String))
)]
pub async fn ping() -> &'static str {
    "pong"
}

/// Ping 모듈.
pub struct PingModule;

impl Module for PingModule {
    fn name(&self) -> &'static str {
        "ping"
    }

    fn router(&self, _state: &AppState) -> Router<Arc<AppState>> {
        Router::new().route("/ping", get(ping))
    }
}
