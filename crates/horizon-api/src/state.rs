//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 `Arc`로 래핑되어 여러 요청 간에 공유됩니다.
//! 서명 키를 담은 [`TokenCodec`]은 시작 시 한 번 만들어지고 이후 변경되지 않습니다.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::HeaderName;
use horizon_core::{AdminError, AdminResult, AuthConfig, CredentialStore, Role, StoreError};
use redis::aio::ConnectionManager;

use crate::auth::{AuthGate, TokenCodec};
use crate::services::AccountService;

/// readiness 확인에 조회하는 학번. 레코드 유무는 보지 않습니다.
const READINESS_LOOKUP_ID: &str = "__readiness__";

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 토큰 코덱 (불변, 공유)
    pub codec: Arc<TokenCodec>,

    /// 계정 서비스 - 로그인, 가입, 비밀번호 변경
    pub accounts: AccountService,

    /// 자격증명 저장소
    pub store: Arc<dyn CredentialStore>,

    /// 토큰을 전달하는 요청 헤더
    pub token_header: HeaderName,

    /// 데이터베이스 연결 풀 (PostgreSQL)
    pub db_pool: Option<sqlx::PgPool>,

    /// Redis 연결 (readiness 확인용)
    pub redis: Option<ConnectionManager>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 인증 설정과 저장소로 상태 생성.
    ///
    /// # Errors
    ///
    /// 토큰 헤더 이름이나 기본 역할이 유효하지 않으면 `AdminError::Config`.
    pub fn new(auth: &AuthConfig, store: Arc<dyn CredentialStore>) -> AdminResult<Self> {
        let header_name = auth.token_header.trim().to_ascii_lowercase();
        let token_header = HeaderName::from_bytes(header_name.as_bytes()).map_err(|e| {
            AdminError::Config(format!(
                "auth.token_header가 유효한 헤더 이름이 아닙니다 ({}): {}",
                auth.token_header, e
            ))
        })?;

        let default_role = auth.default_role().ok_or_else(|| {
            AdminError::Config(format!(
                "auth.default_role_id가 정의된 역할이 아닙니다: {}",
                auth.default_role_id
            ))
        })?;

        let codec = Arc::new(TokenCodec::from_config(auth));
        let accounts = AccountService::new(store.clone(), codec.clone(), default_role);

        Ok(Self {
            codec,
            accounts,
            store,
            token_header,
            db_pool: None,
            redis: None,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// 데이터베이스 연결 설정.
    pub fn with_db_pool(mut self, pool: sqlx::PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Redis URL로 연결 (편의 메서드).
    ///
    /// 연결에 실패하면 경고만 남기고 Redis 없이 계속합니다.
    pub async fn with_redis_url(mut self, redis_url: &str) -> Self {
        match connect_redis(redis_url).await {
            Ok(conn) => {
                tracing::info!("Redis 연결 성공");
                self.redis = Some(conn);
            }
            Err(e) => {
                tracing::warn!("Redis 연결 실패: {}. Redis 없이 계속합니다.", e);
            }
        }
        self
    }

    /// 최소 역할을 요구하는 인증 게이트 생성.
    pub fn gate(&self, min_role: Role) -> AuthGate {
        AuthGate::new(self.codec.clone(), self.token_header.clone(), min_role)
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }

    /// 자격증명 저장소에 조회 한 번을 보내 응답 시간을 잽니다.
    ///
    /// 조회 결과 레코드는 버립니다.
    /// `timeout` 안에 응답이 없으면 `StoreError::Backend`.
    pub async fn check_store(&self, timeout: Duration) -> Result<Duration, StoreError> {
        let started = Instant::now();
        let lookup = self.store.find_by_identifier(READINESS_LOOKUP_ID);
        match tokio::time::timeout(timeout, lookup).await {
            Ok(Ok(_)) => Ok(started.elapsed()),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(StoreError::Backend(format!(
                "{}ms 안에 응답 없음",
                timeout.as_millis()
            ))),
        }
    }

    /// Redis 연결 상태 확인 (`PING`).
    pub async fn is_redis_healthy(&self) -> bool {
        if let Some(conn) = &self.redis {
            let mut conn = conn.clone();
            redis::cmd("PING")
                .query_async::<String>(&mut conn)
                .await
                .is_ok()
        } else {
            false
        }
    }
}

async fn connect_redis(url: &str) -> Result<ConnectionManager, AdminError> {
    let client = redis::Client::open(url).map_err(|e| AdminError::Cache(e.to_string()))?;
    ConnectionManager::new(client)
        .await
        .map_err(|e| AdminError::Cache(e.to_string()))
}

/// 테스트용 JWT 시크릿.
#[cfg(any(test, feature = "test-utils"))]
pub const TEST_JWT_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

/// 테스트용 AppState 생성.
///
/// 메모리 저장소를 사용하며 DB/Redis는 설정되지 않습니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    let auth = AuthConfig {
        jwt_secret: secrecy::SecretString::from(TEST_JWT_SECRET),
        token_ttl_secs: 3600,
        default_role_id: Role::Member.id(),
        token_header: "token".to_string(),
    };
    let store = Arc::new(crate::repository::MemoryUserStore::new());

    // 고정 입력이므로 실패하지 않음
    AppState::new(&auth, store).expect("테스트 상태 생성 실패")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_state() {
        let state = create_test_state();
        assert_eq!(state.token_header.as_str(), "token");
        assert_eq!(state.accounts.default_role(), Role::Member);
        assert!(state.db_pool.is_none());
        assert!(state.redis.is_none());
        assert!(state.uptime_secs() >= 0);
    }

    #[test]
    fn test_invalid_header_name_rejected() {
        let auth = AuthConfig {
            jwt_secret: secrecy::SecretString::from(TEST_JWT_SECRET),
            token_ttl_secs: 3600,
            default_role_id: 1,
            token_header: "bad header".to_string(),
        };
        let store = Arc::new(crate::repository::MemoryUserStore::new());

        assert!(matches!(
            AppState::new(&auth, store),
            Err(AdminError::Config(_))
        ));
    }

    #[test]
    fn test_header_name_normalized() {
        let auth = AuthConfig {
            jwt_secret: secrecy::SecretString::from(TEST_JWT_SECRET),
            token_ttl_secs: 3600,
            default_role_id: 1,
            token_header: "X-Auth-Token".to_string(),
        };
        let store = Arc::new(crate::repository::MemoryUserStore::new());

        let state = AppState::new(&auth, store).unwrap();
        assert_eq!(state.token_header.as_str(), "x-auth-token");
    }

    #[tokio::test]
    async fn test_check_store_against_memory() {
        let state = create_test_state();
        let elapsed = state.check_store(Duration::from_secs(1)).await.unwrap();
        assert!(elapsed < Duration::from_secs(1));
        assert!(!state.is_redis_healthy().await);
    }

    /// 응답하지 않는 저장소.
    struct StalledStore;

    #[async_trait::async_trait]
    impl CredentialStore for StalledStore {
        async fn find_by_identifier(
            &self,
            _: &str,
        ) -> Result<Option<horizon_core::UserRecord>, StoreError> {
            std::future::pending().await
        }
        async fn create(&self, _: &horizon_core::UserRecord) -> Result<(), StoreError> {
            std::future::pending().await
        }
        async fn update_secret_hash(&self, _: &str, _: &str) -> Result<bool, StoreError> {
            std::future::pending().await
        }
        fn store_name(&self) -> &'static str {
            "stalled"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_store_times_out() {
        let auth = AuthConfig {
            jwt_secret: secrecy::SecretString::from(TEST_JWT_SECRET),
            token_ttl_secs: 3600,
            default_role_id: 1,
            token_header: "token".to_string(),
        };
        let state = AppState::new(&auth, Arc::new(StalledStore)).unwrap();

        let result = state.check_store(Duration::from_millis(500)).await;
        assert!(matches!(result, Err(StoreError::Backend(_))));
    }
}
