//! 계정 서비스.
//!
//! 로그인, 가입, 비밀번호 변경을 처리합니다.
//! 요청마다 상태를 갖지 않으며, 첫 번째 실패에서 바로 반환합니다 (fail-fast).

use std::sync::Arc;

use horizon_core::{CredentialStore, Role, UserRecord};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::auth::{
    compare_blocking, hash_password_blocking, TokenCodec, TokenPayload, DECOY_HASH,
};
use crate::error::AccountError;
use crate::metrics::record_account_operation;

/// 로그인 응답.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// 세션 토큰
    pub token: String,
    /// 학번
    pub student_id: String,
    /// 닉네임
    pub nick_name: String,
    /// 역할 ID (0 = guest, 1 = member, 2 = manager, 3 = admin)
    pub role_id: i32,
}

/// 가입 응답 (토큰은 발급하지 않음).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    /// 학번
    pub student_id: String,
    /// 닉네임
    pub nick_name: String,
    /// 역할 ID
    pub role_id: i32,
}

/// 계정 서비스.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn CredentialStore>,
    codec: Arc<TokenCodec>,
    default_role: Role,
    decoy_hash: &'static str,
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService")
            .field("store", &self.store.store_name())
            .field("default_role", &self.default_role)
            .finish_non_exhaustive()
    }
}

impl AccountService {
    /// 새 서비스 생성.
    pub fn new(store: Arc<dyn CredentialStore>, codec: Arc<TokenCodec>, default_role: Role) -> Self {
        Self {
            store,
            codec,
            default_role,
            decoy_hash: DECOY_HASH,
        }
    }

    #[cfg(test)]
    fn with_decoy_hash(mut self, hash: &'static str) -> Self {
        self.decoy_hash = hash;
        self
    }

    /// 가입 시 부여되는 역할.
    pub fn default_role(&self) -> Role {
        self.default_role
    }

    /// 로그인.
    ///
    /// 학번이 없어도 대체 해시로 같은 비용의 검증을 거친 뒤 실패합니다.
    ///
    /// # Errors
    ///
    /// - `NotFound`: 학번 없음 (응답 단계에서 `InvalidCredentials`로 합쳐짐)
    /// - `InvalidCredentials`: 비밀번호 불일치
    /// - `Storage`: 저장소 실패
    pub async fn login(
        &self,
        student_id: &str,
        password: &str,
    ) -> Result<LoginResponse, AccountError> {
        let user = match self.store.find_by_identifier(student_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                if let Err(e) = self.verify_decoy(password).await {
                    record_account_operation("login", "error");
                    return Err(e);
                }
                warn!(student_id, "로그인 실패: 존재하지 않는 사용자");
                record_account_operation("login", "not_found");
                return Err(AccountError::NotFound);
            }
            Err(e) => {
                record_account_operation("login", "error");
                return Err(e.into());
            }
        };

        if !self.verify(password, &user).await? {
            warn!(student_id, "로그인 실패: 비밀번호 불일치");
            record_account_operation("login", "invalid_credentials");
            return Err(AccountError::InvalidCredentials);
        }

        let token = self.codec.issue(&user.student_id, user.role)?;

        info!(
            student_id = %user.student_id,
            nick_name = %user.nick_name,
            role_id = user.role.id(),
            "로그인 성공"
        );
        record_account_operation("login", "success");

        Ok(LoginResponse {
            token,
            student_id: user.student_id,
            nick_name: user.nick_name,
            role_id: user.role.id(),
        })
    }

    /// 가입.
    ///
    /// 기본 역할로 사용자를 생성합니다. 토큰은 발급하지 않습니다.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists`: 이미 사용 중인 학번 (동시 가입 경합 포함)
    /// - `Storage`: 저장소 실패
    pub async fn register(
        &self,
        student_id: &str,
        password: &str,
        nick_name: &str,
    ) -> Result<RegisterResponse, AccountError> {
        match self.store.find_by_identifier(student_id).await {
            Ok(Some(_)) => {
                warn!(student_id, "가입 실패: 이미 존재하는 사용자");
                record_account_operation("register", "already_exists");
                return Err(AccountError::AlreadyExists);
            }
            Ok(None) => {}
            Err(e) => {
                record_account_operation("register", "error");
                return Err(e.into());
            }
        }

        let password_hash = hash_password_blocking(password.to_string()).await?;
        let record = UserRecord::new(student_id, password_hash, nick_name, self.default_role);

        if let Err(e) = self.store.create(&record).await {
            let err = AccountError::from(e);
            if matches!(err, AccountError::AlreadyExists) {
                warn!(student_id, "가입 실패: 동시 가입 경합");
                record_account_operation("register", "already_exists");
            } else {
                record_account_operation("register", "error");
            }
            return Err(err);
        }

        info!(
            student_id = %record.student_id,
            nick_name = %record.nick_name,
            role_id = record.role.id(),
            store = self.store.store_name(),
            "가입 성공"
        );
        record_account_operation("register", "success");

        Ok(RegisterResponse {
            student_id: record.student_id,
            nick_name: record.nick_name,
            role_id: record.role.id(),
        })
    }

    /// 비밀번호 변경.
    ///
    /// 인증 게이트를 통과한 신원에 대해서만 호출됩니다.
    ///
    /// # Errors
    ///
    /// - `NotFound`: 토큰의 학번에 해당하는 사용자가 없음
    /// - `InvalidCredentials`: 기존 비밀번호 불일치
    /// - `Storage`: 저장소 실패
    pub async fn change_password(
        &self,
        identity: &TokenPayload,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AccountError> {
        let student_id = identity.student_id();

        let user = match self.store.find_by_identifier(student_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!(student_id, "비밀번호 변경 실패: 존재하지 않는 사용자");
                record_account_operation("change_password", "not_found");
                return Err(AccountError::NotFound);
            }
            Err(e) => {
                record_account_operation("change_password", "error");
                return Err(e.into());
            }
        };

        if !self.verify(old_password, &user).await? {
            warn!(student_id, "비밀번호 변경 실패: 기존 비밀번호 불일치");
            record_account_operation("change_password", "invalid_credentials");
            return Err(AccountError::InvalidCredentials);
        }

        let new_hash = hash_password_blocking(new_password.to_string()).await?;

        match self.store.update_secret_hash(student_id, &new_hash).await {
            Ok(true) => {}
            Ok(false) => {
                record_account_operation("change_password", "not_found");
                return Err(AccountError::NotFound);
            }
            Err(e) => {
                record_account_operation("change_password", "error");
                return Err(e.into());
            }
        }

        info!(
            student_id = %user.student_id,
            nick_name = %user.nick_name,
            role_id = user.role.id(),
            "비밀번호 변경 성공"
        );
        record_account_operation("change_password", "success");
        Ok(())
    }

    /// 결과는 버리고 검증 비용만 치릅니다.
    async fn verify_decoy(&self, password: &str) -> Result<(), AccountError> {
        compare_blocking(password.to_string(), self.decoy_hash.to_string())
            .await
            .map(|_| ())
            .map_err(|e| {
                tracing::error!(error = %e, "대체 해시 검증 실패");
                AccountError::from(e)
            })
    }

    async fn verify(&self, password: &str, user: &UserRecord) -> Result<bool, AccountError> {
        compare_blocking(password.to_string(), user.password_hash.clone())
            .await
            .map_err(|e| {
                tracing::error!(student_id = %user.student_id, error = %e, "비밀번호 검증 실패");
                AccountError::from(e)
            })
    }
}
