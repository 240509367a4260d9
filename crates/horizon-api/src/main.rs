//! Horizon 관리 API 서버 진입점.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, routing::get, Router};
use horizon_api::{
    create_app_router, setup_metrics_recorder, AppState, MemoryUserStore, PgUserRepository,
};
use horizon_core::{
    init_logging, AdminError, AppConfig, CorsConfig, CredentialStore, LogConfig, RunMode,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let config = AppConfig::load_default()?;

    init_logging(LogConfig::from_app(config.mode, &config.logging))?;
    info!(mode = ?config.mode, "Horizon 관리 API 서버 시작");

    let metrics_handle = setup_metrics_recorder()?;
    info!("Prometheus 메트릭 레코더 초기화 완료");

    let state = Arc::new(create_app_state(&config).await?);
    info!(
        version = %state.version,
        store = state.store.store_name(),
        has_db = state.db_pool.is_some(),
        has_redis = state.redis.is_some(),
        token_header = %state.token_header,
        "애플리케이션 상태 초기화 완료"
    );

    let shutdown_token = CancellationToken::new();
    let cleanup = spawn_cleanup(shutdown_token.clone(), state.db_pool.clone());

    let prefix = config.server.route_prefix();
    let cors = cors_layer(&config.cors, &state.token_header);
    let app = create_app_router(state, &prefix, cors).merge(metrics_router(metrics_handle));

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, prefix = %prefix, "API 서버 수신 대기");
    info!("Swagger UI: http://{}/swagger-ui", addr);
    info!("Metrics: http://{}/metrics", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
        .await?;

    info!("서버 종료 시작, 정리 작업 중...");
    shutdown_token.cancel();

    if tokio::time::timeout(Duration::from_secs(10), cleanup)
        .await
        .is_err()
    {
        warn!("정리 작업 타임아웃, 강제 종료");
    }

    info!("서버가 정상 종료되었습니다");
    Ok(())
}

/// 저장소와 선택적 의존성(DB, Redis)을 연결해 상태를 만듭니다.
///
/// DB 연결 실패는 release 모드에서 치명적입니다.
/// debug 모드에서는 메모리 저장소로 계속합니다.
async fn create_app_state(config: &AppConfig) -> Result<AppState, AdminError> {
    let pool = match connect_database(config).await {
        Ok(pool) => Some(pool),
        Err(e) if allows_memory_fallback(config.mode) => {
            warn!(error = %e, "데이터베이스 연결 실패. 메모리 저장소로 계속합니다 (debug 모드)");
            None
        }
        Err(e) => {
            error!(error = %e, "데이터베이스 연결 실패");
            return Err(e);
        }
    };

    let store: Arc<dyn CredentialStore> = match &pool {
        Some(pool) => {
            let repo = PgUserRepository::new(pool.clone());
            repo.migrate()
                .await
                .map_err(|e| AdminError::Database(e.to_string()))?;
            info!("데이터베이스 마이그레이션 완료");
            Arc::new(repo)
        }
        None => Arc::new(MemoryUserStore::new()),
    };

    let mut state = AppState::new(&config.auth, store)?;

    if let Some(pool) = pool {
        state = state.with_db_pool(pool);
    }

    if let Some(url) = &config.redis.url {
        state = state.with_redis_url(url).await;
    }

    Ok(state)
}

/// DB 없이 메모리 저장소로 기동할 수 있는 실행 모드인지.
fn allows_memory_fallback(mode: RunMode) -> bool {
    mode == RunMode::Debug
}

async fn connect_database(config: &AppConfig) -> Result<sqlx::PgPool, AdminError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connection_timeout_secs))
        .connect(&config.database.url)
        .await
        .map_err(|e| AdminError::Database(e.to_string()))?;

    sqlx::query("SELECT 1")
        .fetch_one(&pool)
        .await
        .map_err(|e| AdminError::Database(e.to_string()))?;

    info!("PostgreSQL 연결 성공");
    Ok(pool)
}

/// 종료 토큰이 취소되면 DB 연결 풀을 닫는 정리 태스크.
fn spawn_cleanup(
    shutdown_token: CancellationToken,
    db_pool: Option<sqlx::PgPool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        shutdown_token.cancelled().await;
        if let Some(pool) = db_pool {
            pool.close().await;
            info!("데이터베이스 연결 풀 종료");
        }
    })
}

/// CORS 레이어 생성.
///
/// `cors.allowed_origins`가 비어 있으면 모든 origin을 허용합니다 (개발용).
fn cors_layer(config: &CorsConfig, token_header: &axum::http::HeaderName) -> CorsLayer {
    let origins: Vec<_> = config
        .allowed_origins
        .iter()
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let restricted = !origins.is_empty();
    let allow_origin = if restricted {
        info!("CORS 허용 origin {}개 설정", origins.len());
        AllowOrigin::list(origins)
    } else {
        if !config.allowed_origins.is_empty() {
            warn!("cors.allowed_origins에 유효한 origin이 없어 모든 origin을 허용합니다");
        } else {
            warn!("cors.allowed_origins 미설정, 모든 origin 허용 (개발 모드)");
        }
        AllowOrigin::any()
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
            token_header.clone(),
        ])
        // origin 목록이 있을 때만 자격 증명 허용
        .allow_credentials(restricted)
        .max_age(Duration::from_secs(3600))
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}

fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(handle)
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM을 수신하면 종료 토큰을 취소합니다.
/// 시그널 핸들러 설치에 실패하면 해당 시그널은 무시됩니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Ctrl+C 핸들러 설치 실패");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "SIGTERM 핸들러 설치 실패");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Ctrl+C 수신, graceful shutdown 시작");
        }
        _ = terminate => {
            warn!("SIGTERM 수신, graceful shutdown 시작");
        }
    }

    shutdown_token.cancel();
}
