//! 검증 요청 추출기.
//!
//! JSON 본문을 역직렬화한 뒤 `validator` 규칙으로 검사합니다.
//! 구문 오류와 검증 실패는 모두 `InvalidRequest`가 됩니다.

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::error::AccountError;

/// 검증된 JSON 추출기.
///
/// # 사용 예시
///
/// ```rust,ignore
/// async fn register(ValidatedJson(req): ValidatedJson<RegisterRequest>) -> impl IntoResponse {
///     // req는 검증을 통과한 값
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AccountError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e.body_text(), "JSON 본문 해석 실패");
            AccountError::InvalidRequest(e.body_text())
        })?;

        value.validate().map_err(|errors| {
            let message = validation_message(&errors);
            tracing::debug!(%message, "요청 검증 실패");
            AccountError::InvalidRequest(message)
        })?;

        Ok(ValidatedJson(value))
    }
}

/// 필드 에러를 한 줄 메시지로 합칩니다.
fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: 유효하지 않은 값", field))
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}
