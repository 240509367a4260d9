//! 비밀번호 해싱 및 검증.
//!
//! Argon2id 기반 단방향 해시. 평문 비밀번호는 저장하거나 직접 비교하지 않습니다.
//!
//! 검증은 저장된 해시의 파라미터로 입력을 다시 해싱한 뒤 결과를 상수 시간으로
//! 비교합니다 (`password-hash`의 `Output` 비교). 따라서 비교 시간은 입력이
//! 어느 위치에서 달라지는지에 의존하지 않습니다. 이 성질은 벽시계 시간으로
//! 테스트하지 않으며, 단위 테스트는 정확성만 확인합니다.

use argon2::{
    password_hash::{
        self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};

/// 존재하지 않는 학번의 로그인 검증에 쓰는 대체 해시.
///
/// `Argon2::default()`와 같은 파라미터로 기록되어 있어 실제 계정의 검증과 비용이 같습니다.
/// 이 해시에 대응하는 비밀번호는 알려져 있지 않습니다.
pub const DECOY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$V+GC1r92pyOJtDuJYx34Aw$dI8vQPawvenl/jgmijYLDXfBELzqZLD8V1fgGQsWBTo";

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
    #[error("해싱 작업 실행 실패: {0}")]
    TaskFailed(String),
}

/// 비밀번호 해싱.
///
/// 솔트는 매번 새로 생성되므로 같은 비밀번호도 다른 해시가 됩니다.
///
/// # Returns
///
/// PHC 형식의 해시 문자열 (`$argon2id$v=19$...`)
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| PasswordError::HashingFailed)?;

    Ok(hash.to_string())
}

/// 평문 비밀번호와 저장된 해시 비교.
///
/// # Returns
///
/// - `Ok(true)`: 일치
/// - `Ok(false)`: 불일치
/// - `Err(InvalidHashFormat)`: 저장된 해시를 해석할 수 없음
pub fn compare(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(_) => Err(PasswordError::InvalidHashFormat),
    }
}

/// [`hash_password`]를 blocking 스레드 풀에서 실행.
pub async fn hash_password_blocking(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PasswordError::TaskFailed(e.to_string()))?
}

/// [`compare`]를 blocking 스레드 풀에서 실행.
pub async fn compare_blocking(password: String, stored_hash: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || compare(&password, &stored_hash))
        .await
        .map_err(|e| PasswordError::TaskFailed(e.to_string()))?
}
