//! 자격증명 저장소 구현.
//!
//! [`horizon_core::CredentialStore`] trait의 구현체를 제공합니다.
//! - [`PgUserRepository`]: PostgreSQL (운영)
//! - [`MemoryUserStore`]: 메모리 (DB 미설정 시, 테스트)

pub mod memory;
pub mod users;

pub use memory::MemoryUserStore;
pub use users::PgUserRepository;
