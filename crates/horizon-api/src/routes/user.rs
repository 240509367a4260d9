//! 사용자 모듈 endpoint.
//!
//! 로그인, 가입, 비밀번호 변경, 현재 토큰 신원 조회를 제공합니다.
//! 비밀번호 변경과 신원 조회는 `Member` 이상의 토큰이 필요합니다.
//!
//! 문서 경로의 `/api`는 [`crate::openapi::DOC_PREFIX`]이며 서빙 시 설정된 접두사로 바뀝니다.

use std::sync::Arc;

use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Json, Router,
};
use horizon_core::Role;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::Module;
use crate::auth::{auth_gate, AuthUser};
use crate::error::{AccountError, ApiErrorResponse, ApiResult};
use crate::extract::ValidatedJson;
use crate::services::{LoginResponse, RegisterResponse};
use crate::state::AppState;

// ==================== 요청/응답 타입 ====================
// 요청 타입은 비밀번호를 담으므로 Debug를 구현하지 않음

/// 로그인 요청.
#[derive(Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// 학번
    #[validate(length(min = 1, max = 32, message = "학번은 1-32자여야 합니다"))]
    pub student_id: String,
    /// 비밀번호
    #[validate(length(min = 6, max = 128, message = "비밀번호는 6-128자여야 합니다"))]
    pub password: String,
}

/// 가입 요청.
#[derive(Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// 학번 (가입 후 변경 불가)
    #[validate(length(min = 1, max = 32, message = "학번은 1-32자여야 합니다"))]
    pub student_id: String,
    /// 비밀번호
    #[validate(length(min = 6, max = 128, message = "비밀번호는 6-128자여야 합니다"))]
    pub password: String,
    /// 닉네임
    #[validate(length(min = 1, max = 32, message = "닉네임은 1-32자여야 합니다"))]
    pub nick_name: String,
}

/// 비밀번호 변경 요청.
#[derive(Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    /// 기존 비밀번호
    #[validate(length(min = 1, max = 128, message = "기존 비밀번호는 1-128자여야 합니다"))]
    pub old_password: String,
    /// 새 비밀번호
    #[validate(length(min = 6, max = 128, message = "새 비밀번호는 6-128자여야 합니다"))]
    pub new_password: String,
}

/// 성공 응답 (데이터 없음).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

/// 현재 토큰 신원.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    /// 학번
    pub student_id: String,
    /// 역할 ID
    pub role_id: i32,
    /// 토큰 발급 시간 (Unix timestamp)
    pub issued_at: i64,
    /// 토큰 만료 시간 (Unix timestamp)
    pub expires_at: i64,
}

// ==================== 핸들러 ====================

/// POST /api/user/login - 로그인
///
/// 존재하지 않는 학번과 잘못된 비밀번호는 같은 응답을 받습니다.
#[utoipa::path(
    post,
    path = "/api/user/login",
    tag = "user",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "로그인 성공", body = LoginResponse),
        (status = 400, description = "잘못된 요청", body = ApiErrorResponse),
        (status = 401, description = "학번 또는 비밀번호 불일치", body = ApiErrorResponse)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let response = state
        .accounts
        .login(&req.student_id, &req.password)
        .await
        .map_err(AccountError::for_login)?;

    Ok(Json(response))
}

/// POST /api/user/register - 가입
#[utoipa::path(
    post,
    path = "/api/user/register",
    tag = "user",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "가입 성공", body = RegisterResponse),
        (status = 400, description = "잘못된 요청", body = ApiErrorResponse),
        (status = 409, description = "이미 존재하는 학번", body = ApiErrorResponse)
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<Json<RegisterResponse>> {
    let response = state
        .accounts
        .register(&req.student_id, &req.password, &req.nick_name)
        .await?;

    Ok(Json(response))
}

/// POST /api/user/change-password - 비밀번호 변경
#[utoipa::path(
    post,
    path = "/api/user/change-password",
    tag = "user",
    request_body = ChangePasswordRequest,
    params(("token" = String, Header, description = "세션 토큰")),
    responses(
        (status = 200, description = "변경 성공", body = SuccessResponse),
        (status = 401, description = "토큰 무효 또는 기존 비밀번호 불일치", body = ApiErrorResponse),
        (status = 403, description = "권한 부족", body = ApiErrorResponse),
        (status = 404, description = "사용자 없음", body = ApiErrorResponse)
    )
)]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    state
        .accounts
        .change_password(&identity, &req.old_password, &req.new_password)
        .await?;

    Ok(Json(SuccessResponse {
        success: true,
        message: "비밀번호가 변경되었습니다".to_string(),
    }))
}

/// GET /api/user/me - 현재 토큰 신원 조회
#[utoipa::path(
    get,
    path = "/api/user/me",
    tag = "user",
    params(("token" = String, Header, description = "세션 토큰")),
    responses(
        (status = 200, description = "토큰 신원", body = MeResponse),
        (status = 401, description = "토큰 무효", body = ApiErrorResponse)
    )
)]
pub async fn me(AuthUser(identity): AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        student_id: identity.sub,
        role_id: identity.role.id(),
        issued_at: identity.iat,
        expires_at: identity.exp,
    })
}

// ==================== 라우터 ====================

/// 사용자 라우터 생성.
pub fn user_router(state: &AppState) -> Router<Arc<AppState>> {
    let protected = Router::new()
        .route("/change-password", post(change_password))
        .route("/me", get(me))
        .route_layer(middleware::from_fn_with_state(
            state.gate(Role::Member),
            auth_gate,
        ));

    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .merge(protected)
}

/// 사용자 모듈.
pub struct UserModule;

impl Module for UserModule {
    fn name(&self) -> &'static str {
        "user"
    }

    fn router(&self, state: &AppState) -> Router<Arc<AppState>> {
        Router::new().nest("/user", user_router(state))
    }
}
