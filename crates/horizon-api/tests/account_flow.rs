//! 전체 라우터를 통한 계정 흐름 통합 테스트.
//!
//! 메모리 저장소를 사용하므로 DB 없이 실행됩니다.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use horizon_api::{create_app_router, create_test_state};
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

fn app() -> Router {
    create_app_router(Arc::new(create_test_state()), "/api", CorsLayer::permissive())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn register(app: &Router, student_id: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        post_json(
            "/api/user/register",
            json!({"student_id": student_id, "password": password, "nick_name": "테스터"}),
        ),
    )
    .await
}

async fn login(app: &Router, student_id: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        post_json(
            "/api/user/login",
            json!({"student_id": student_id, "password": password}),
        ),
    )
    .await
}

#[tokio::test]
async fn test_full_account_lifecycle() {
    let app = app();

    let (status, body) = register(&app, "2024001", "first-pass").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["student_id"], "2024001");
    assert_eq!(body["role_id"], 1);
    assert!(body.get("token").is_none());

    let (status, body) = login(&app, "2024001", "first-pass").await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(body["nick_name"], "테스터");

    // 신원 조회
    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/api/user/me")
            .header("token", &token)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["student_id"], "2024001");
    assert_eq!(body["role_id"], 1);

    // 비밀번호 변경
    let mut request = post_json(
        "/api/user/change-password",
        json!({"old_password": "first-pass", "new_password": "second-pass"}),
    );
    request
        .headers_mut()
        .insert("token", token.parse().unwrap());
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = login(&app, "2024001", "second-pass").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = login(&app, "2024001", "first-pass").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = app();

    let (status, _) = register(&app, "2024002", "password1").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = register(&app, "2024002", "password2").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ALREADY_EXISTS");

    // 최초 비밀번호 유지
    let (status, _) = login(&app, "2024002", "password1").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_user_and_wrong_password_look_the_same() {
    let app = app();
    register(&app, "2024003", "password1").await;

    let (unknown_status, unknown_body) = login(&app, "9999999", "password1").await;
    let (wrong_status, wrong_body) = login(&app, "2024003", "wrong-pass").await;

    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, wrong_status);
    assert_eq!(unknown_body["code"], wrong_body["code"]);
    assert_eq!(unknown_body["message"], wrong_body["message"]);
}

#[tokio::test]
async fn test_protected_route_without_token() {
    let app = app();

    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/api/user/me")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "TOKEN_INVALID");

    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/api/user/me")
            .header("token", "not-a-token")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "TOKEN_INVALID");
}

#[tokio::test]
async fn test_bearer_header_is_accepted() {
    let app = app();
    register(&app, "2024004", "password1").await;
    let (_, body) = login(&app, "2024004", "password1").await;
    let token = body["token"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/api/user/me")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["student_id"], "2024004");
}

#[tokio::test]
async fn test_invalid_request_bodies() {
    let app = app();

    // 비밀번호 길이 미달
    let (status, body) = register(&app, "2024005", "short").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REQUEST");

    // JSON 문법 오류
    let request = Request::builder()
        .method("POST")
        .uri("/api/user/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_ping_and_health() {
    let app = app();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/ping").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"pong");

    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/health/ready")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["credential_store"]["backend"], "memory");
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = app();

    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/api-docs/openapi.json")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/api/user/login").is_some());
}

#[tokio::test]
async fn test_openapi_paths_follow_custom_prefix() {
    let app = create_app_router(Arc::new(create_test_state()), "/v2", CorsLayer::permissive());

    let (status, _) = login(&app, "2024006", "password1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/api-docs/openapi.json")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/v2/user/login").is_some());
    assert!(body["paths"].get("/api/user/login").is_none());
    assert!(body["paths"].get("/health/ready").is_some());
}
