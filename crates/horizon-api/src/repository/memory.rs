//! 메모리 기반 사용자 저장소.
//!
//! DB 없이 서버를 실행하거나 테스트할 때 사용합니다.
//! 프로세스가 종료되면 데이터가 사라집니다.

use std::collections::HashMap;

use async_trait::async_trait;
use horizon_core::{CredentialStore, StoreError, UserRecord};
use tokio::sync::RwLock;

/// 메모리 사용자 저장소.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryUserStore {
    /// 빈 저장소 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 사용자 수.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// 저장소가 비어 있는지 확인.
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryUserStore {
    async fn find_by_identifier(&self, student_id: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.read().await.get(student_id).cloned())
    }

    async fn create(&self, record: &UserRecord) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&record.student_id) {
            return Err(StoreError::Duplicate(record.student_id.clone()));
        }
        users.insert(record.student_id.clone(), record.clone());
        Ok(())
    }

    async fn update_secret_hash(
        &self,
        student_id: &str,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        match users.get_mut(student_id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}
