//! 인증 게이트 미들웨어.
//!
//! 보호된 라우트 앞에서 토큰을 추출·검증하고 최소 역할을 확인한 뒤,
//! 검증된 [`TokenPayload`]를 요청 extension에 넣습니다.
//! 게이트는 저장소에 접근하지 않습니다.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        header::{HeaderName, AUTHORIZATION},
        request::Parts,
        HeaderMap,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use horizon_core::Role;

use super::{TokenCodec, TokenPayload};
use crate::error::AccountError;
use crate::metrics::record_gate_decision;

/// 인증 게이트.
///
/// `min_role = Role::Guest`이면 인증만 확인합니다.
///
/// # 사용 예시
///
/// ```rust,ignore
/// Router::new()
///     .route("/change-password", post(change_password))
///     .route_layer(middleware::from_fn_with_state(
///         state.gate(Role::Member),
///         auth_gate,
///     ))
/// ```
#[derive(Debug, Clone)]
pub struct AuthGate {
    codec: Arc<TokenCodec>,
    header: HeaderName,
    min_role: Role,
}

impl AuthGate {
    /// 새 게이트 생성.
    pub fn new(codec: Arc<TokenCodec>, header: HeaderName, min_role: Role) -> Self {
        Self {
            codec,
            header,
            min_role,
        }
    }

    /// 요청 헤더에서 토큰 추출.
    ///
    /// 설정된 헤더를 먼저 확인하고, 없으면 `Authorization: Bearer <token>`을 사용합니다.
    fn extract_token<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        if let Some(value) = headers.get(&self.header) {
            return value.to_str().ok().map(str::trim).filter(|t| !t.is_empty());
        }

        headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// 헤더를 검사하여 인증/인가 결과를 반환.
    ///
    /// # Errors
    ///
    /// - `AccountError::Unauthenticated`: 토큰이 없거나 유효하지 않음
    /// - `AccountError::Unauthorized`: 유효하지만 역할이 부족함
    pub fn authorize(&self, headers: &HeaderMap) -> Result<TokenPayload, AccountError> {
        let Some(token) = self.extract_token(headers) else {
            record_gate_decision("missing_token");
            tracing::debug!("인증 토큰 없음");
            return Err(AccountError::Unauthenticated);
        };

        let Some(payload) = self.codec.parse(token) else {
            record_gate_decision("invalid_token");
            tracing::info!("유효하지 않은 토큰으로 접근 시도");
            return Err(AccountError::Unauthenticated);
        };

        if !payload.role.satisfies(self.min_role) {
            record_gate_decision("forbidden");
            tracing::warn!(
                student_id = %payload.sub,
                role_id = payload.role.id(),
                required_role_id = self.min_role.id(),
                "권한 부족으로 접근 거부"
            );
            return Err(AccountError::Unauthorized);
        }

        record_gate_decision("allowed");
        Ok(payload)
    }
}

/// 게이트 판정.
///
/// [`auth_gate`]가 응답 extension에 남기며, 바깥쪽 메트릭 레이어가 라벨로 읽습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// 통과
    Allowed,
    /// 토큰 없음 또는 무효
    Unauthenticated,
    /// 역할 부족
    Forbidden,
}

impl GateDecision {
    /// 메트릭 라벨 값.
    pub fn as_str(self) -> &'static str {
        match self {
            GateDecision::Allowed => "allowed",
            GateDecision::Unauthenticated => "unauthenticated",
            GateDecision::Forbidden => "forbidden",
        }
    }
}

/// 인증 게이트 미들웨어 함수.
///
/// `middleware::from_fn_with_state(gate, auth_gate)`로 라우트에 적용합니다.
/// 거부된 요청은 핸들러에 도달하지 않습니다.
pub async fn auth_gate(
    State(gate): State<AuthGate>,
    mut request: Request,
    next: Next,
) -> Response {
    let (decision, mut response) = match gate.authorize(request.headers()) {
        Ok(payload) => {
            request.extensions_mut().insert(payload);
            (GateDecision::Allowed, next.run(request).await)
        }
        Err(AccountError::Unauthorized) => (
            GateDecision::Forbidden,
            AccountError::Unauthorized.into_response(),
        ),
        Err(e) => (GateDecision::Unauthenticated, e.into_response()),
    };

    response.extensions_mut().insert(decision);
    response
}

/// 인증된 사용자 추출기.
///
/// 게이트가 넣어 둔 [`TokenPayload`]를 읽습니다.
/// 게이트 없이 마운트된 라우트에서는 `Unauthenticated`로 거부합니다.
#[derive(Debug, Clone)]
pub struct AuthUser(pub TokenPayload);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AccountError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TokenPayload>()
            .cloned()
            .map(AuthUser)
            .ok_or(AccountError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{HeaderValue, Request, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use secrecy::SecretString;
    use std::time::Duration;
    use tower::ServiceExt;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

    fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new(
            &SecretString::from(TEST_SECRET),
            Duration::from_secs(3600),
        ))
    }

    fn gate(min_role: Role) -> AuthGate {
        AuthGate::new(codec(), HeaderName::from_static("token"), min_role)
    }

    fn headers_with(name: &'static str, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_missing_token_unauthenticated() {
        let result = gate(Role::Guest).authorize(&HeaderMap::new());
        assert!(matches!(result, Err(AccountError::Unauthenticated)));
    }

    #[test]
    fn test_invalid_token_unauthenticated() {
        let result = gate(Role::Guest).authorize(&headers_with("token", "garbage"));
        assert!(matches!(result, Err(AccountError::Unauthenticated)));
    }

    #[test]
    fn test_manager_gate_rejects_member() {
        let gate = gate(Role::Manager);
        let token = codec().issue("20240001", Role::Member).unwrap();

        let result = gate.authorize(&headers_with("token", &token));
        assert!(matches!(result, Err(AccountError::Unauthorized)));
    }

    #[test]
    fn test_manager_gate_admits_manager_and_admin() {
        let gate = gate(Role::Manager);
        for role in [Role::Manager, Role::Admin] {
            let token = codec().issue("20240001", role).unwrap();
            let payload = gate.authorize(&headers_with("token", &token)).unwrap();
            assert_eq!(payload.role, role);
        }
    }

    #[test]
    fn test_guest_gate_admits_every_role() {
        let gate = gate(Role::Guest);
        for role in Role::ALL {
            let token = codec().issue("neo", role).unwrap();
            assert!(gate.authorize(&headers_with("token", &token)).is_ok());
        }
    }

    #[test]
    fn test_bearer_fallback() {
        let token = codec().issue("20240001", Role::Member).unwrap();
        let headers = headers_with("authorization", &format!("Bearer {}", token));

        let payload = gate(Role::Member).authorize(&headers).unwrap();
        assert_eq!(payload.sub, "20240001");
    }

    #[test]
    fn test_configured_header_takes_precedence() {
        let good = codec().issue("20240001", Role::Member).unwrap();
        let mut headers = headers_with("token", "garbage");
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", good)).unwrap(),
        );

        let result = gate(Role::Member).authorize(&headers);
        assert!(matches!(result, Err(AccountError::Unauthenticated)));
    }

    async fn whoami(AuthUser(payload): AuthUser) -> String {
        format!("{}:{}", payload.sub, payload.role.id())
    }

    fn protected_app(min_role: Role) -> Router {
        Router::new()
            .route("/me", get(whoami))
            .route_layer(middleware::from_fn_with_state(gate(min_role), auth_gate))
    }

    #[tokio::test]
    async fn test_middleware_injects_identity() {
        let token = codec().issue("20240001", Role::Admin).unwrap();

        let response = protected_app(Role::Manager)
            .oneshot(
                Request::builder()
                    .uri("/me")
                    .header("token", token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.extensions().get::<GateDecision>(),
            Some(&GateDecision::Allowed)
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"20240001:3");
    }

    #[tokio::test]
    async fn test_middleware_rejects_before_handler() {
        let response = protected_app(Role::Member)
            .oneshot(Request::builder().uri("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.extensions().get::<GateDecision>(),
            Some(&GateDecision::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn test_middleware_marks_forbidden_response() {
        let token = codec().issue("20240001", Role::Member).unwrap();

        let response = protected_app(Role::Manager)
            .oneshot(
                Request::builder()
                    .uri("/me")
                    .header("token", token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            response.extensions().get::<GateDecision>(),
            Some(&GateDecision::Forbidden)
        );
    }

    #[tokio::test]
    async fn test_extractor_without_gate_rejects() {
        let app = Router::new().route("/me", get(whoami));

        let response = app
            .oneshot(Request::builder().uri("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
