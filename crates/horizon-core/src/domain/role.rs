//! 역할 기반 접근 제어 (RBAC).
//!
//! 사용자 역할은 명시적인 정수 서열을 가진 열거형입니다.
//! 값이 클수록 더 많은 권한을 가지며, 최소 역할 검사는 단순 비교로 수행됩니다.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 사용자 역할.
///
/// DB와 토큰에는 정수 ID로 저장됩니다.
///
/// | 역할 | ID |
/// |------|----|
/// | `Guest` | 0 |
/// | `Member` | 1 |
/// | `Manager` | 2 |
/// | `Admin` | 3 |
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "i32", into = "i32")]
#[repr(i32)]
pub enum Role {
    /// 게스트 - 인증만 된 상태
    Guest = 0,
    /// 일반 회원 - 가입 시 기본 역할
    #[default]
    Member = 1,
    /// 매니저 - 운영 기능 접근
    Manager = 2,
    /// 관리자 - 모든 권한 보유
    Admin = 3,
}

/// 알 수 없는 역할 ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("알 수 없는 역할 ID: {0}")]
pub struct UnknownRole(pub i32);

impl Role {
    /// 정의된 모든 역할 (서열 오름차순).
    pub const ALL: [Role; 4] = [Role::Guest, Role::Member, Role::Manager, Role::Admin];

    /// 역할의 정수 ID 반환.
    pub fn id(self) -> i32 {
        self as i32
    }

    /// 정수 ID에서 역할 조회.
    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.id() == id)
    }

    /// `required` 이상의 역할인지 확인.
    pub fn satisfies(self, required: Role) -> bool {
        self >= required
    }
}

impl TryFrom<i32> for Role {
    type Error = UnknownRole;

    fn try_from(id: i32) -> Result<Self, Self::Error> {
        Role::from_id(id).ok_or(UnknownRole(id))
    }
}

impl From<Role> for i32 {
    fn from(role: Role) -> Self {
        role.id()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Guest => "guest",
            Role::Member => "member",
            Role::Manager => "manager",
            Role::Admin => "admin",
        };
        write!(f, "{}", s)
    }
}
