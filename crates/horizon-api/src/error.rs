//! 통합 API 에러 타입.
//!
//! 계정 작업과 인증 게이트에서 발생하는 모든 실패는 [`AccountError`]의 한 종류로
//! 변환되며, 응답은 [`ApiErrorResponse`] JSON 형식으로 직렬화됩니다.
//!
//! | 종류 | 코드 | 상태 |
//! |------|------|------|
//! | `InvalidRequest` | `INVALID_REQUEST` | 400 |
//! | `NotFound` | `NOT_FOUND` | 404 |
//! | `AlreadyExists` | `ALREADY_EXISTS` | 409 |
//! | `InvalidCredentials` | `INVALID_CREDENTIALS` | 401 |
//! | `Unauthenticated` | `TOKEN_INVALID` | 401 |
//! | `Unauthorized` | `UNAUTHORIZED` | 403 |
//! | `Storage` | `DATABASE_ERROR` | 500 |
//! | `Internal` | `INTERNAL_ERROR` | 500 |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use horizon_core::StoreError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{PasswordError, TokenError};

/// API 에러 응답 본문.
///
/// # 예시
///
/// ```json
/// {
///   "code": "INVALID_CREDENTIALS",
///   "message": "학번 또는 비밀번호가 올바르지 않습니다",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "INVALID_REQUEST", "TOKEN_INVALID")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 에러 발생 타임스탬프 (Unix timestamp, 선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

// ==================== AccountError ====================

/// 계정 작업 및 인증 에러.
///
/// 실패 하나는 정확히 한 종류로 보고됩니다.
/// `Storage`와 `Internal`의 원인은 로그에만 남고 클라이언트에는 노출되지 않습니다.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("잘못된 요청: {0}")]
    InvalidRequest(String),
    #[error("사용자를 찾을 수 없습니다")]
    NotFound,
    #[error("이미 존재하는 사용자입니다")]
    AlreadyExists,
    #[error("학번 또는 비밀번호가 올바르지 않습니다")]
    InvalidCredentials,
    #[error("유효하지 않은 토큰입니다")]
    Unauthenticated,
    #[error("권한이 부족합니다")]
    Unauthorized,
    #[error("저장소 에러: {0}")]
    Storage(#[source] StoreError),
    #[error("내부 에러: {0}")]
    Internal(String),
}

impl AccountError {
    /// 안정적인 에러 코드.
    pub fn code(&self) -> &'static str {
        match self {
            AccountError::InvalidRequest(_) => "INVALID_REQUEST",
            AccountError::NotFound => "NOT_FOUND",
            AccountError::AlreadyExists => "ALREADY_EXISTS",
            AccountError::InvalidCredentials => "INVALID_CREDENTIALS",
            AccountError::Unauthenticated => "TOKEN_INVALID",
            AccountError::Unauthorized => "UNAUTHORIZED",
            AccountError::Storage(_) => "DATABASE_ERROR",
            AccountError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP 상태 코드.
    pub fn status(&self) -> StatusCode {
        match self {
            AccountError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AccountError::NotFound => StatusCode::NOT_FOUND,
            AccountError::AlreadyExists => StatusCode::CONFLICT,
            AccountError::InvalidCredentials | AccountError::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            }
            AccountError::Unauthorized => StatusCode::FORBIDDEN,
            AccountError::Storage(_) | AccountError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 클라이언트에 보낼 메시지.
    pub fn public_message(&self) -> String {
        match self {
            AccountError::Storage(_) => "데이터베이스 처리 중 오류가 발생했습니다".to_string(),
            AccountError::Internal(_) => "서버 내부 오류가 발생했습니다".to_string(),
            other => other.to_string(),
        }
    }

    /// 로그인 응답용 변환.
    ///
    /// 계정 존재 여부가 드러나지 않도록 `NotFound`를 `InvalidCredentials`로 합칩니다.
    /// 구분은 서비스 로그에만 남습니다.
    pub fn for_login(self) -> Self {
        match self {
            AccountError::NotFound => AccountError::InvalidCredentials,
            other => other,
        }
    }

    /// 응답 본문 생성.
    pub fn to_response_body(&self) -> ApiErrorResponse {
        ApiErrorResponse::new(self.code(), self.public_message())
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        match &self {
            AccountError::Storage(e) => tracing::error!(error = %e, "저장소 에러"),
            AccountError::Internal(e) => tracing::error!(error = %e, "내부 에러"),
            _ => {}
        }

        (self.status(), Json(self.to_response_body())).into_response()
    }
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(_) => AccountError::AlreadyExists,
            other => AccountError::Storage(other),
        }
    }
}

impl From<PasswordError> for AccountError {
    fn from(err: PasswordError) -> Self {
        AccountError::Internal(err.to_string())
    }
}

impl From<TokenError> for AccountError {
    fn from(err: TokenError) -> Self {
        AccountError::Internal(err.to_string())
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, AccountError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_response_new() {
        let error = ApiErrorResponse::new("TEST_ERROR", "Test message");
        assert_eq!(error.code, "TEST_ERROR");
        assert!(error.timestamp.is_some());
        assert_eq!(error.message, "Test message");
    }

    #[test]
    fn test_error_code_and_status_table() {
        let cases = [
            (AccountError::InvalidRequest("x".into()), "INVALID_REQUEST", 400),
            (AccountError::NotFound, "NOT_FOUND", 404),
            (AccountError::AlreadyExists, "ALREADY_EXISTS", 409),
            (AccountError::InvalidCredentials, "INVALID_CREDENTIALS", 401),
            (AccountError::Unauthenticated, "TOKEN_INVALID", 401),
            (AccountError::Unauthorized, "UNAUTHORIZED", 403),
            (
                AccountError::Storage(StoreError::Backend("down".into())),
                "DATABASE_ERROR",
                500,
            ),
            (AccountError::Internal("boom".into()), "INTERNAL_ERROR", 500),
        ];

        for (error, code, status) in cases {
            assert_eq!(error.code(), code);
            assert_eq!(error.status().as_u16(), status);
        }
    }

    #[test]
    fn test_storage_cause_not_exposed() {
        let error = AccountError::Storage(StoreError::Backend("password=hunter2".into()));
        assert!(!error.public_message().contains("hunter2"));
        assert!(error.to_string().contains("hunter2"));
    }

    #[test]
    fn test_for_login_merges_not_found() {
        let merged = AccountError::NotFound.for_login();
        assert!(matches!(merged, AccountError::InvalidCredentials));

        let body_a = AccountError::NotFound.for_login().to_response_body();
        let body_b = AccountError::InvalidCredentials.to_response_body();
        assert_eq!(body_a.code, body_b.code);
        assert_eq!(body_a.message, body_b.message);

        assert!(matches!(
            AccountError::AlreadyExists.for_login(),
            AccountError::AlreadyExists
        ));
    }

    #[test]
    fn test_duplicate_store_error_maps_to_already_exists() {
        let error: AccountError = StoreError::Duplicate("20240001".into()).into();
        assert!(matches!(error, AccountError::AlreadyExists));

        let error: AccountError = StoreError::Corrupt("role 9".into()).into();
        assert!(matches!(error, AccountError::Storage(_)));
    }

    #[tokio::test]
    async fn test_into_response_body() {
        let response = AccountError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: ApiErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.code, "UNAUTHORIZED");
    }
}
