//! OpenAPI 문서화 설정.
//!
//! utoipa로 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! 새 엔드포인트를 추가할 때는 핸들러에 `#[utoipa::path(...)]`를 붙이고
//! 이 파일의 `paths(...)`와 `components(schemas(...))`에 등록합니다.
//!
//! 핸들러 주석의 경로는 [`DOC_PREFIX`] 기준으로 적고, 실제 라우트 접두사로의
//! 치환은 [`api_doc`]이 서빙 시점에 합니다.

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiErrorResponse;
use crate::routes::{
    ChangePasswordRequest, ComponentState, LoginRequest, MeResponse, Readiness, ReadinessResponse,
    RegisterRequest, StoreHealth, SuccessResponse, TokenSettings,
};
use crate::services::{LoginResponse, RegisterResponse};

/// Horizon Cloud 관리 API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Horizon Cloud Admin API",
        description = r#"
# Horizon Cloud 관리 백엔드 REST API

학번 기반 계정 관리를 제공합니다.

## 인증

보호된 엔드포인트는 `token` 헤더(설정 가능)에 세션 토큰이 필요합니다.
헤더가 없으면 `Authorization: Bearer <token>`도 허용합니다.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "system", description = "시스템 - 헬스 체크 및 연결 확인"),
        (name = "user", description = "사용자 - 로그인, 가입, 비밀번호 변경")
    ),
    components(
        schemas(
            // ===== Common =====
            ApiErrorResponse,
            SuccessResponse,

            // ===== Health =====
            ReadinessResponse,
            Readiness,
            ComponentState,
            StoreHealth,
            TokenSettings,

            // ===== User =====
            LoginRequest,
            LoginResponse,
            RegisterRequest,
            RegisterResponse,
            ChangePasswordRequest,
            MeResponse,
        )
    ),
    paths(
        // ===== System =====
        crate::routes::health::health_check,
        crate::routes::health::health_ready,
        crate::routes::ping::ping,

        // ===== User =====
        crate::routes::user::login,
        crate::routes::user::register,
        crate::routes::user::change_password,
        crate::routes::user::me,
    )
)]
pub struct ApiDoc;

/// `#[utoipa::path]` 주석에 적힌 API 경로 접두사.
pub const DOC_PREFIX: &str = "/api";

/// 라우트 접두사에 맞춘 OpenAPI 문서.
///
/// [`DOC_PREFIX`]로 시작하는 경로만 바꾸며 `/health` 계열은 그대로 둡니다.
pub fn api_doc(prefix: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    if prefix == DOC_PREFIX {
        return doc;
    }

    doc.paths.paths = std::mem::take(&mut doc.paths.paths)
        .into_iter()
        .map(|(path, item)| match path.strip_prefix(DOC_PREFIX) {
            Some(rest) if rest.starts_with('/') => (format!("{}{}", prefix, rest), item),
            _ => (path, item),
        })
        .collect();
    doc
}

/// Swagger UI 라우터 생성.
///
/// - `/swagger-ui` - Swagger UI 대화형 문서
/// - `/api-docs/openapi.json` - OpenAPI JSON 스펙
pub fn swagger_ui_router<S>(prefix: &str) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", api_doc(prefix))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_valid() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&spec).unwrap();

        assert!(json.contains("Horizon Cloud Admin API"));

        assert!(json.contains("/health/ready"));
        assert!(json.contains("/api/ping"));
        assert!(json.contains("/api/user/login"));
        assert!(json.contains("/api/user/register"));
        assert!(json.contains("/api/user/change-password"));
        assert!(json.contains("/api/user/me"));
    }

    #[test]
    fn test_openapi_contains_schemas() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string(&spec).unwrap();

        assert!(json.contains("LoginRequest"));
        assert!(json.contains("LoginResponse"));
        assert!(json.contains("ApiErrorResponse"));
        assert!(json.contains("ReadinessResponse"));
    }

    #[test]
    fn test_paths_follow_route_prefix() {
        let doc = api_doc("/v2");
        assert!(doc.paths.paths.contains_key("/v2/user/login"));
        assert!(doc.paths.paths.contains_key("/v2/ping"));
        assert!(!doc.paths.paths.contains_key("/api/user/login"));
        assert!(doc.paths.paths.contains_key("/health/ready"));

        let doc = api_doc("");
        assert!(doc.paths.paths.contains_key("/user/me"));
        assert!(doc.paths.paths.contains_key("/health"));
    }

    #[test]
    fn test_default_prefix_unchanged() {
        let doc = api_doc(DOC_PREFIX);
        assert_eq!(doc.paths.paths.len(), ApiDoc::openapi().paths.paths.len());
        assert!(doc.paths.paths.contains_key("/api/user/change-password"));
    }
}
