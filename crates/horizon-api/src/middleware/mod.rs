//! API 서버용 HTTP middleware.
//!
//! 요청 처리 파이프라인에 적용되는 middleware 모듈.
//! 인증 게이트는 [`crate::auth`]에 있습니다.

mod metrics;

pub use metrics::{access_label, metrics_layer, PUBLIC_ACCESS};
