//! 자격증명 저장소 추상화.
//!
//! 학번으로 사용자 레코드를 조회·생성·갱신하는 저장소 인터페이스입니다.
//! 동시성 제어(행 단위 원자성, 고유 인덱스)는 구현체가 책임집니다.

use async_trait::async_trait;
use thiserror::Error;

use super::UserRecord;

// =============================================================================
// 에러 타입
// =============================================================================

/// CredentialStore 에러.
#[derive(Debug, Error)]
pub enum StoreError {
    /// 동일한 학번이 이미 존재 (고유 제약 위반)
    #[error("이미 존재하는 식별자: {0}")]
    Duplicate(String),

    /// 저장된 레코드가 도메인 규칙을 위반 (예: 알 수 없는 역할 ID)
    #[error("손상된 레코드: {0}")]
    Corrupt(String),

    /// 백엔드 에러 (연결 실패, 쿼리 실패 등)
    #[error("저장소 에러: {0}")]
    Backend(String),
}

// =============================================================================
// CredentialStore Trait
// =============================================================================

/// 사용자 자격증명 저장소 trait.
///
/// # 구현 예시
///
/// ```ignore
/// pub struct PgUserRepository {
///     pool: PgPool,
/// }
///
/// #[async_trait]
/// impl CredentialStore for PgUserRepository {
///     async fn find_by_identifier(&self, student_id: &str) -> Result<Option<UserRecord>, StoreError> {
///         // SELECT ... WHERE student_id = $1
///     }
///
///     // ... 나머지 메서드 구현
/// }
/// ```
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// 학번으로 사용자 조회.
    ///
    /// # Returns
    ///
    /// 레코드가 없으면 `Ok(None)`.
    ///
    /// # Errors
    ///
    /// - `StoreError::Backend`: 저장소 접근 실패
    /// - `StoreError::Corrupt`: 레코드 변환 실패
    async fn find_by_identifier(&self, student_id: &str) -> Result<Option<UserRecord>, StoreError>;

    /// 새 사용자 저장.
    ///
    /// # Errors
    ///
    /// - `StoreError::Duplicate`: 동일한 학번이 이미 존재
    /// - `StoreError::Backend`: 저장소 접근 실패
    async fn create(&self, record: &UserRecord) -> Result<(), StoreError>;

    /// 비밀번호 해시 교체.
    ///
    /// # Returns
    ///
    /// 갱신된 레코드가 있으면 `true`, 해당 학번이 없으면 `false`.
    async fn update_secret_hash(
        &self,
        student_id: &str,
        password_hash: &str,
    ) -> Result<bool, StoreError>;

    /// 저장소 이름 반환 (로깅용).
    fn store_name(&self) -> &'static str;
}
