//! 계정 관리를 위한 도메인 모델.

mod credential_store;
mod role;
mod user;

pub use credential_store::*;
pub use role::*;
pub use user::*;
