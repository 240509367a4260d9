//! Users Repository
//!
//! PostgreSQL `users` 테이블에 대한 [`CredentialStore`] 구현.

use async_trait::async_trait;
use horizon_core::{CredentialStore, Role, StoreError, UserRecord};
use sqlx::{FromRow, PgPool};

// ================================================================================================
// Types
// ================================================================================================

/// DB 행 표현.
#[derive(Debug, FromRow)]
struct UserRow {
    student_id: String,
    password_hash: String,
    nick_name: String,
    role_id: i32,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::try_from(row.role_id).map_err(|e| {
            StoreError::Corrupt(format!("student_id={}: {}", row.student_id, e))
        })?;
        Ok(UserRecord::new(
            row.student_id,
            row.password_hash,
            row.nick_name,
            role,
        ))
    }
}

// ================================================================================================
// Repository
// ================================================================================================

/// PostgreSQL 사용자 저장소.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// 연결 풀로 저장소 생성.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 임베디드 마이그레이션 실행.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        tracing::info!("데이터베이스 마이그레이션 실행");

        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        tracing::info!("마이그레이션 완료");
        Ok(())
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl CredentialStore for PgUserRepository {
    async fn find_by_identifier(&self, student_id: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT student_id, password_hash, nick_name, role_id
            FROM users
            WHERE student_id = $1
            "#,
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(UserRecord::try_from).transpose()
    }

    async fn create(&self, record: &UserRecord) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (student_id, password_hash, nick_name, role_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&record.student_id)
        .bind(&record.password_hash)
        .bind(&record.nick_name)
        .bind(record.role.id())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            // 동시 가입 경합은 고유 인덱스가 막음
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::Duplicate(record.student_id.clone()))
            }
            Err(e) => Err(backend(e)),
        }
    }

    async fn update_secret_hash(
        &self,
        student_id: &str,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE student_id = $1
            "#,
        )
        .bind(student_id)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(result.rows_affected() > 0)
    }

    fn store_name(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role_id: i32) -> UserRow {
        UserRow {
            student_id: "20240001".to_string(),
            password_hash: "$argon2id$v=19$...".to_string(),
            nick_name: "neo".to_string(),
            role_id,
        }
    }

    #[test]
    fn test_row_conversion() {
        let record = UserRecord::try_from(row(2)).unwrap();
        assert_eq!(record.student_id, "20240001");
        assert_eq!(record.role, Role::Manager);
    }

    #[test]
    fn test_row_with_unknown_role_is_corrupt() {
        let err = UserRecord::try_from(row(42)).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }
}
