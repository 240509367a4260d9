//! 관리자 백엔드의 공통 에러 타입.
//!
//! 서버 부트스트랩(설정 로드, DB/Redis 연결) 단계에서 사용되는 에러를 정의합니다.
//! 요청 단위의 에러는 API 크레이트의 `AccountError`가 담당합니다.

use thiserror::Error;

/// 부트스트랩 에러.
#[derive(Debug, Error)]
pub enum AdminError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 데이터베이스 에러
    #[error("데이터베이스 에러: {0}")]
    Database(String),

    /// 캐시(Redis) 에러
    #[error("캐시 에러: {0}")]
    Cache(String),
}

/// 부트스트랩 작업을 위한 Result 타입.
pub type AdminResult<T> = Result<T, AdminError>;

impl From<config::ConfigError> for AdminError {
    fn from(err: config::ConfigError) -> Self {
        AdminError::Config(err.to_string())
    }
}
