//! 사용자 레코드.

use serde::{Deserialize, Serialize};

use super::Role;

/// 저장소에 보관되는 사용자 레코드.
///
/// `student_id`는 가입 후 변경되지 않으며, 이후 변경되는 필드는 `password_hash`뿐입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// 학번 (고유 식별자)
    pub student_id: String,
    /// PHC 형식의 비밀번호 해시
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// 닉네임
    pub nick_name: String,
    /// 사용자 역할
    pub role: Role,
}

impl UserRecord {
    /// 새 사용자 레코드 생성.
    pub fn new(
        student_id: impl Into<String>,
        password_hash: impl Into<String>,
        nick_name: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            password_hash: password_hash.into(),
            nick_name: nick_name.into(),
            role,
        }
    }
}
