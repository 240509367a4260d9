//! HTTP 요청 메트릭 미들웨어.
//!
//! 라우트 라벨은 매칭된 라우트 패턴을 우선 사용하고, 매칭 정보가 없으면
//! [`normalize_path`]로 숫자 세그먼트를 접습니다.
//! 응답에는 인증 게이트가 남긴 [`GateDecision`]을 `access` 라벨로 붙입니다.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};

use crate::auth::GateDecision;
use crate::metrics::{
    normalize_path, record_http_duration, record_http_request, record_http_response,
};

/// 게이트가 없는 라우트의 `access` 라벨.
pub const PUBLIC_ACCESS: &str = "public";

/// 요청 수, 응답 수(`access` 포함), 처리 시간을 기록하는 미들웨어.
pub async fn metrics_layer(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let route = route_label(&request);

    record_http_request(&method, &route);

    let response = next.run(request).await;

    record_http_response(
        &method,
        &route,
        response.status().as_u16(),
        access_label(&response),
    );
    record_http_duration(&method, &route, started.elapsed().as_secs_f64());

    response
}

fn route_label(request: &Request) -> String {
    match request.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_string(),
        None => normalize_path(request.uri().path()),
    }
}

/// 응답이 어떤 게이트 판정을 거쳤는지.
pub fn access_label(response: &Response) -> &'static str {
    response
        .extensions()
        .get::<GateDecision>()
        .map_or(PUBLIC_ACCESS, |decision| decision.as_str())
}
