//! # Horizon Core
//!
//! 관리자 백엔드의 핵심 도메인 모델 및 공통 인프라를 제공합니다.
//!
//! 이 크레이트는 API 서버 전반에서 사용되는 기본 타입을 제공합니다:
//! - 사용자 레코드 및 역할(Role) 정의
//! - 자격증명 저장소 추상화 ([`CredentialStore`])
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
